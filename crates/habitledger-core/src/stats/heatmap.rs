//! Completion heatmap.
//!
//! Each day in a range gets an intensity level from the number of habits
//! completed that day. The range (week, month, rolling year) only changes
//! which days are visited; the bucketing is the same everywhere.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_key::{days_in_range, month_start, week_start};
use crate::error::ValidationError;
use crate::habit::{is_day_complete, Habit};

/// Map a completed-habit count to a 0-4 intensity level.
pub fn intensity_level(completed: u32) -> u8 {
    match completed {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

/// Which days a heatmap covers relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapRange {
    /// Monday-anchored week containing the reference date
    Week,
    /// Calendar month containing the reference date
    Month,
    /// The 365 days ending at the reference date
    Year,
}

impl HeatmapRange {
    /// Inclusive `(start, end)` bounds for this range.
    pub fn bounds(&self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            HeatmapRange::Week => {
                let start = week_start(reference);
                (start, start + Duration::days(6))
            }
            HeatmapRange::Month => {
                let start = month_start(reference);
                let next = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                let end = next.and_then(|n| n.pred_opt()).unwrap_or(reference);
                (start, end)
            }
            HeatmapRange::Year => (reference - Duration::days(364), reference),
        }
    }
}

impl fmt::Display for HeatmapRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeatmapRange::Week => "week",
            HeatmapRange::Month => "month",
            HeatmapRange::Year => "year",
        })
    }
}

impl FromStr for HeatmapRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(HeatmapRange::Week),
            "month" => Ok(HeatmapRange::Month),
            "year" => Ok(HeatmapRange::Year),
            _ => Err(ValidationError::InvalidValue {
                field: "range".into(),
                message: format!("'{s}' is not one of week, month, year"),
            }),
        }
    }
}

/// One heatmap day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub completed: u32,
    pub level: u8,
}

impl HeatmapDay {
    /// Character for ASCII rendering.
    pub fn heat_char(&self) -> char {
        match self.level {
            0 => '·',
            1 => '░',
            2 => '▒',
            3 => '▓',
            _ => '█',
        }
    }
}

/// Heatmap over an inclusive day range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<HeatmapDay>,
    /// Days with at least one completion
    pub active_days: u32,
    pub total_completions: u64,
}

impl Heatmap {
    pub fn get_day(&self, date: NaiveDate) -> Option<&HeatmapDay> {
        if date < self.start {
            return None;
        }
        let idx = (date - self.start).num_days() as usize;
        self.days.get(idx)
    }

    /// Highest completion count in the range, with its day.
    pub fn peak(&self) -> Option<&HeatmapDay> {
        self.days
            .iter()
            .filter(|d| d.completed > 0)
            .max_by(|a, b| a.completed.cmp(&b.completed).then(b.date.cmp(&a.date)))
    }
}

/// Heatmap builder and renderer.
#[derive(Debug, Clone, Default)]
pub struct HeatmapAnalyzer;

impl HeatmapAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Build a heatmap for the inclusive range `start..=end`.
    pub fn build(&self, habits: &[Habit], start: NaiveDate, end: NaiveDate) -> Heatmap {
        let days: Vec<HeatmapDay> = days_in_range(start, end)
            .map(|date| {
                let completed = habits.iter().filter(|h| is_day_complete(h, date)).count() as u32;
                HeatmapDay {
                    date,
                    completed,
                    level: intensity_level(completed),
                }
            })
            .collect();

        let active_days = days.iter().filter(|d| d.completed > 0).count() as u32;
        let total_completions = days.iter().map(|d| d.completed as u64).sum();

        Heatmap {
            start,
            end,
            days,
            active_days,
            total_completions,
        }
    }

    /// Build a heatmap for a named range around `reference`.
    pub fn build_range(&self, habits: &[Habit], range: HeatmapRange, reference: NaiveDate) -> Heatmap {
        let (start, end) = range.bounds(reference);
        self.build(habits, start, end)
    }

    /// Render as a weekday-by-week grid, GitHub contribution style.
    pub fn render_ascii(&self, heatmap: &Heatmap) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nHabit Heatmap {} .. {}\n", heatmap.start, heatmap.end));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if heatmap.total_completions == 0 {
            output.push_str("No completions in this range.\n");
            return output;
        }

        output.push_str(&format!(
            "Completions: {}  Active days: {}/{}\n\n",
            heatmap.total_completions,
            heatmap.active_days,
            heatmap.days.len()
        ));

        let grid_start = week_start(heatmap.start);
        let weeks = ((heatmap.end - grid_start).num_days() / 7 + 1) as usize;

        for (row, name) in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"].iter().enumerate() {
            output.push_str(&format!("{:<4}", name));
            for week in 0..weeks {
                let date = grid_start + Duration::days((week * 7 + row) as i64);
                let ch = heatmap.get_day(date).map(|d| d.heat_char()).unwrap_or(' ');
                output.push(ch);
            }
            output.push('\n');
        }

        output.push('\n');
        output.push_str("Legend: · (0) ░ (1-2) ▒ (3-4) ▓ (5-6) █ (7+)\n");

        if let Some(peak) = heatmap.peak() {
            output.push_str(&format!(
                "Best day: {} with {} completions\n",
                peak.date, peak.completed
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Frequency, HistoryValue};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn done_on(title: &str, keys: &[&str]) -> Habit {
        let mut habit = Habit::new(title, Frequency::Daily, 0);
        for key in keys {
            habit.history.insert((*key).into(), HistoryValue::Done);
        }
        habit
    }

    #[test]
    fn test_intensity_thresholds() {
        let expected = [(0, 0), (1, 1), (2, 1), (3, 2), (4, 2), (5, 3), (6, 3), (7, 4), (30, 4)];
        for (count, level) in expected {
            assert_eq!(intensity_level(count), level, "count {count}");
        }
    }

    #[test]
    fn test_range_bounds() {
        let wed = d(2024, 2, 14);
        assert_eq!(HeatmapRange::Week.bounds(wed), (d(2024, 2, 12), d(2024, 2, 18)));
        assert_eq!(HeatmapRange::Month.bounds(wed), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(
            HeatmapRange::Month.bounds(d(2024, 12, 5)),
            (d(2024, 12, 1), d(2024, 12, 31))
        );
        assert_eq!(HeatmapRange::Year.bounds(wed), (d(2023, 2, 15), wed));
    }

    #[test]
    fn test_build_counts_completed_habits() {
        let habits = vec![
            done_on("a", &["2024-01-01", "2024-01-02"]),
            done_on("b", &["2024-01-02"]),
            done_on("c", &["2024-01-02"]),
        ];
        let heatmap = HeatmapAnalyzer::new().build(&habits, d(2024, 1, 1), d(2024, 1, 3));

        assert_eq!(heatmap.days.len(), 3);
        assert_eq!(heatmap.get_day(d(2024, 1, 1)).unwrap().level, 1);
        let busiest = heatmap.get_day(d(2024, 1, 2)).unwrap();
        assert_eq!(busiest.completed, 3);
        assert_eq!(busiest.level, 2);
        assert_eq!(heatmap.get_day(d(2024, 1, 3)).unwrap().level, 0);
        assert_eq!(heatmap.active_days, 2);
        assert_eq!(heatmap.total_completions, 4);
        assert_eq!(heatmap.peak().unwrap().date, d(2024, 1, 2));
    }

    #[test]
    fn test_partial_counted_day_not_in_heatmap() {
        let mut habit = Habit::new("Water", Frequency::TimesPerDay, 0).with_target_count(3);
        habit.history.insert("2024-01-01".into(), HistoryValue::Count(2));
        let heatmap = HeatmapAnalyzer::new().build(&[habit], d(2024, 1, 1), d(2024, 1, 1));
        assert_eq!(heatmap.days[0].completed, 0);
    }

    #[test]
    fn test_year_range_has_365_days() {
        let heatmap = HeatmapAnalyzer::new().build_range(&[], HeatmapRange::Year, d(2024, 6, 30));
        assert_eq!(heatmap.days.len(), 365);
        assert_eq!(heatmap.total_completions, 0);
    }

    #[test]
    fn test_render_ascii_output() {
        let habits = vec![done_on("a", &["2024-01-01"]), done_on("b", &["2024-01-01"])];
        let analyzer = HeatmapAnalyzer::new();
        let heatmap = analyzer.build_range(&habits, HeatmapRange::Week, d(2024, 1, 3));
        let output = analyzer.render_ascii(&heatmap);

        assert!(output.contains("Habit Heatmap"));
        assert!(output.contains("Mon ░"));
        assert!(output.contains("Best day: 2024-01-01 with 2 completions"));
    }

    #[test]
    fn test_render_ascii_empty() {
        let analyzer = HeatmapAnalyzer::new();
        let heatmap = analyzer.build_range(&[], HeatmapRange::Week, d(2024, 1, 3));
        assert!(analyzer.render_ascii(&heatmap).contains("No completions"));
    }

    #[test]
    fn test_range_parse() {
        assert_eq!("Month".parse::<HeatmapRange>().unwrap(), HeatmapRange::Month);
        assert!("decade".parse::<HeatmapRange>().is_err());
    }
}

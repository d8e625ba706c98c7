//! Per-habit summary over a trailing window.

use chrono::{Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::date_key::{days_in_range, parse_date_key, weekday_index};
use crate::habit::{
    fraction_on, is_applicable, is_day_complete, weekly_progress, Frequency, Habit,
    StreakCalculator, WeeklyProgress,
};

/// Summary of one habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub title: String,
    pub frequency: Frequency,
    pub window_days: u32,
    /// Applicable days in the window
    pub applicable_days: u32,
    /// Fully complete applicable days in the window
    pub completed_days: u32,
    /// Mean fraction over applicable days in the window, 0-100
    pub completion_rate: f64,
    /// Complete days over the whole history
    pub total_completions: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Weekday (0=Sunday) with the most completions in the window
    pub strongest_weekday: Option<u8>,
    /// Present for weekly-target habits
    pub weekly: Option<WeeklyProgress>,
}

/// Builds [`HabitSummary`] values.
pub struct HabitSummaryAnalyzer<Tz: TimeZone = Local> {
    pub window_days: u32,
    calculator: StreakCalculator<Tz>,
}

impl Default for HabitSummaryAnalyzer<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitSummaryAnalyzer<Local> {
    pub fn new() -> Self {
        Self {
            window_days: 30,
            calculator: StreakCalculator::new(),
        }
    }
}

impl<Tz: TimeZone> HabitSummaryAnalyzer<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self {
            window_days: 30,
            calculator: StreakCalculator::with_timezone(tz),
        }
    }

    pub fn with_window(mut self, days: u32) -> Self {
        self.window_days = days.max(1);
        self
    }

    /// Summarize `habit` for the window ending at `today`.
    pub fn summarize(&self, habit: &Habit, today: NaiveDate) -> HabitSummary {
        let tz = self.calculator.timezone();
        let start = today - Duration::days(self.window_days as i64 - 1);

        let mut applicable_days = 0;
        let mut completed_days = 0;
        let mut fraction_sum = 0.0;
        let mut by_weekday = [0u32; 7];

        for day in days_in_range(start, today) {
            if !is_applicable(habit, day, tz) {
                continue;
            }
            applicable_days += 1;
            fraction_sum += fraction_on(habit, day);
            if is_day_complete(habit, day) {
                completed_days += 1;
                by_weekday[weekday_index(day) as usize] += 1;
            }
        }

        let completion_rate = if applicable_days == 0 {
            0.0
        } else {
            100.0 * fraction_sum / applicable_days as f64
        };

        // Ties go to the earlier weekday index.
        let strongest_weekday = by_weekday
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(idx, _)| idx as u8);

        let total_completions = habit
            .history
            .keys()
            .filter_map(|key| parse_date_key(key).ok())
            .filter(|day| *day <= today && is_day_complete(habit, *day))
            .count() as u32;

        let streak = self.calculator.recompute(habit, today);
        let best_streak = streak
            .best_streak
            .max(self.calculator.longest_run(habit, today));

        HabitSummary {
            habit_id: habit.id.clone(),
            title: habit.title.clone(),
            frequency: habit.frequency,
            window_days: self.window_days,
            applicable_days,
            completed_days,
            completion_rate,
            total_completions,
            streak: streak.streak,
            best_streak,
            strongest_weekday,
            weekly: (habit.frequency == Frequency::TimesPerWeek)
                .then(|| weekly_progress(habit, today)),
        }
    }

    pub fn summarize_all(&self, habits: &[Habit], today: NaiveDate) -> Vec<HabitSummary> {
        habits.iter().map(|h| self.summarize(h, today)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_key::date_key;
    use crate::habit::HistoryValue;
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn created() -> i64 {
        Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn test_summary_over_window() {
        let mut habit = Habit::new("Read", Frequency::Daily, created());
        for day in [d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 8), d(2024, 1, 9)] {
            habit.history.insert(date_key(day), HistoryValue::Done);
        }

        let summary = HabitSummaryAnalyzer::with_timezone(Utc)
            .with_window(10)
            .summarize(&habit, d(2024, 1, 10));

        assert_eq!(summary.applicable_days, 10);
        assert_eq!(summary.completed_days, 5);
        assert!((summary.completion_rate - 50.0).abs() < 1e-9);
        assert_eq!(summary.total_completions, 5);
        assert_eq!(summary.streak, 2);
        assert_eq!(summary.best_streak, 3);
        // Mon 1st and Mon 8th
        assert_eq!(summary.strongest_weekday, Some(1));
        assert!(summary.weekly.is_none());
    }

    #[test]
    fn test_summary_weekly_target() {
        let mut habit =
            Habit::new("Swim", Frequency::TimesPerWeek, created()).with_target_count(2);
        habit.history.insert("2024-01-08".into(), HistoryValue::Done);
        let summary = HabitSummaryAnalyzer::with_timezone(Utc).summarize(&habit, d(2024, 1, 10));
        let weekly = summary.weekly.unwrap();
        assert_eq!(weekly.completed_days, 1);
        assert!(!weekly.met);
    }

    #[test]
    fn test_summary_of_never_applicable_habit() {
        let habit = Habit::new("Nothing", Frequency::SpecificDays, created());
        let summary = HabitSummaryAnalyzer::with_timezone(Utc).summarize(&habit, d(2024, 1, 10));
        assert_eq!(summary.applicable_days, 0);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.strongest_weekday, None);
    }
}

//! Monday-first weekly rhythm.

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::day::day_rate;
use crate::date_key::week_start;
use crate::habit::Habit;

/// One weekday bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmDay {
    pub date: NaiveDate,
    /// Short weekday name, Monday first
    pub label: String,
    pub applicable: u32,
    /// Mean completion fraction of applicable habits, 0-100
    pub percent: f64,
}

/// Rhythm of the week containing the reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRhythm {
    pub week_start: NaiveDate,
    pub days: Vec<RhythmDay>,
}

const LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Seven-day rhythm for the Monday-anchored week containing `reference`.
pub fn weekly_rhythm<Tz: TimeZone>(habits: &[Habit], reference: NaiveDate, tz: &Tz) -> WeeklyRhythm {
    let start = week_start(reference);
    let days = LABELS
        .iter()
        .enumerate()
        .map(|(offset, label)| {
            let date = start + Duration::days(offset as i64);
            let rate = day_rate(habits, date, tz);
            RhythmDay {
                date,
                label: (*label).to_string(),
                applicable: rate.applicable,
                percent: rate.percent(),
            }
        })
        .collect();

    WeeklyRhythm {
        week_start: start,
        days,
    }
}

//! Today's completion ring.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::day::day_rate;
use crate::habit::Habit;

/// Completed vs. expected habits for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRing {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    /// 0-100; defined as 0 when no habit is expected
    pub percent: f64,
}

/// Build the ring for `today`.
pub fn daily_ring<Tz: TimeZone>(habits: &[Habit], today: NaiveDate, tz: &Tz) -> DailyRing {
    let rate = day_rate(habits, today, tz);
    let percent = if rate.applicable == 0 {
        0.0
    } else {
        100.0 * rate.completed as f64 / rate.applicable as f64
    };

    DailyRing {
        date: today,
        completed: rate.completed,
        total: rate.applicable,
        percent,
    }
}

//! Per-day completion across a habit set, shared by the ring, rhythm and
//! rollup reducers.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::habit::{fraction_on, is_applicable, Habit};

/// Completion of every applicable habit on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRate {
    pub date: NaiveDate,
    /// Habits expected on this day
    pub applicable: u32,
    /// Applicable habits whose fraction reached 1
    pub completed: u32,
    /// Sum of completion fractions over applicable habits
    pub fraction_sum: f64,
}

impl DayRate {
    /// Mean fraction as a 0-100 percentage; 0 when nothing was applicable.
    pub fn percent(&self) -> f64 {
        if self.applicable == 0 {
            0.0
        } else {
            100.0 * self.fraction_sum / self.applicable as f64
        }
    }
}

/// Fold one day's completion over `habits`.
pub fn day_rate<Tz: TimeZone>(habits: &[Habit], date: NaiveDate, tz: &Tz) -> DayRate {
    let mut rate = DayRate {
        date,
        applicable: 0,
        completed: 0,
        fraction_sum: 0.0,
    };

    for habit in habits.iter().filter(|h| is_applicable(h, date, tz)) {
        let fraction = fraction_on(habit, date);
        rate.applicable += 1;
        rate.fraction_sum += fraction;
        if fraction >= 1.0 {
            rate.completed += 1;
        }
    }

    rate
}

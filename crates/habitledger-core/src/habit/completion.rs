//! How much of a day's target a stored value represents.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::model::{Frequency, Habit, HistoryValue};
use crate::date_key::week_start;

/// Completion fraction in `[0, 1]` for one day's raw value.
///
/// Counted habits earn partial credit (`count / target`, capped at 1); a
/// legacy `true` on a counted habit counts as full. Boolean-style habits are
/// all-or-nothing on truthiness.
pub fn day_completion_fraction(habit: &Habit, raw: Option<&HistoryValue>) -> f64 {
    let Some(value) = raw else {
        return 0.0;
    };

    match (habit.frequency, value) {
        (_, HistoryValue::Done) => 1.0,
        (_, HistoryValue::NotDone) => 0.0,
        (Frequency::TimesPerDay, HistoryValue::Count(n)) => {
            (*n as f64 / habit.target() as f64).clamp(0.0, 1.0)
        }
        (_, HistoryValue::Count(n)) => {
            if *n > 0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Fraction for the value stored on `date`.
pub fn fraction_on(habit: &Habit, date: NaiveDate) -> f64 {
    day_completion_fraction(habit, habit.value_on(date))
}

/// A day is complete when its fraction reaches 1.
pub fn is_day_complete(habit: &Habit, date: NaiveDate) -> bool {
    fraction_on(habit, date) >= 1.0
}

/// Progress of a weekly target over one Monday-anchored week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub week_start: NaiveDate,
    /// Complete days in the week, counting only days up to `as_of`
    pub completed_days: u32,
    pub target: u32,
    /// `completed_days / target`, capped at 1
    pub fraction: f64,
    pub met: bool,
}

/// Weekly progress of `habit` for the week containing `as_of`.
///
/// Intended for `TimesPerWeek` habits; any habit gets a count of its
/// complete days against its effective target.
pub fn weekly_progress(habit: &Habit, as_of: NaiveDate) -> WeeklyProgress {
    let start = week_start(as_of);
    let completed_days = (0..7)
        .map(|offset| start + Duration::days(offset))
        .filter(|day| *day <= as_of)
        .filter(|day| is_day_complete(habit, *day))
        .count() as u32;

    let target = habit.target();
    let fraction = (completed_days as f64 / target as f64).min(1.0);

    WeeklyProgress {
        week_start: start,
        completed_days,
        target,
        fraction,
        met: completed_days >= target,
    }
}

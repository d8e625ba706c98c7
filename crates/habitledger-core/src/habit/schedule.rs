//! Whether a habit is expected on a given day.

use chrono::{NaiveDate, TimeZone};

use super::model::{Frequency, Habit};
use crate::date_key::{local_day, weekday_index};

/// Calendar day (in `tz`) on which the habit was created.
pub fn creation_day<Tz: TimeZone>(habit: &Habit, tz: &Tz) -> NaiveDate {
    local_day(habit.created_at, tz)
}

/// Is `habit` expected to be performed on `date`?
///
/// Days before the creation day are never applicable. A `SpecificDays` habit
/// with no target days is never applicable; it does not fall back to daily.
/// Weekly and per-day targets are evaluated elsewhere, so every day is a
/// candidate for them.
pub fn is_applicable<Tz: TimeZone>(habit: &Habit, date: NaiveDate, tz: &Tz) -> bool {
    if date < creation_day(habit, tz) {
        return false;
    }

    match habit.frequency {
        Frequency::Daily | Frequency::TimesPerWeek | Frequency::TimesPerDay => true,
        Frequency::SpecificDays => {
            debug_assert!(
                habit.target_days.iter().all(|d| *d <= 6),
                "target_days out of range: {:?}",
                habit.target_days
            );
            let weekday = weekday_index(date);
            habit.target_days.contains(&weekday)
        }
    }
}

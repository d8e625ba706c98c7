//! Habit records, applicability, completion policy and streaks.

mod completion;
mod model;
mod schedule;
mod streak;

pub use completion::{
    day_completion_fraction, fraction_on, is_day_complete, weekly_progress, WeeklyProgress,
};
pub use model::{normalize_target_days, Frequency, Habit, History, HistoryValue};
pub use schedule::{creation_day, is_applicable};
pub use streak::{StreakCalculator, StreakUpdate, ToggleOutcome};

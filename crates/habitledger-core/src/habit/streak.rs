//! Streak calculation and the toggle operation.
//!
//! The toggle is the only entry point that mutates a habit's history. It
//! applies the history edit first and only then recomputes the cached
//! `streak` / `best_streak`, so the recomputation always sees the
//! post-mutation history.

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::completion::{day_completion_fraction, is_day_complete};
use super::model::{Habit, HistoryValue};
use super::schedule::{creation_day, is_applicable};
use crate::date_key::{date_key, days_in_range, parse_date_key};

/// Result of a streak recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub streak: u32,
    pub best_streak: u32,
}

/// What a toggle did to today's entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub date_key: String,
    pub previous: Option<HistoryValue>,
    pub current: Option<HistoryValue>,
    pub streak: StreakUpdate,
}

impl ToggleOutcome {
    /// True when the toggle removed today's entry.
    pub fn cleared(&self) -> bool {
        self.current.is_none()
    }
}

/// Streak calculator bound to the caller's time zone.
///
/// The zone only matters for turning `created_at` into a calendar day;
/// "today" is always passed in explicitly.
pub struct StreakCalculator<Tz: TimeZone = Local> {
    tz: Tz,
}

impl Default for StreakCalculator<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl StreakCalculator<Local> {
    /// Create a calculator for the system's local zone.
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> StreakCalculator<Tz> {
    /// Create a calculator for an explicit zone.
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Current streak ending at `today`, plus the updated best streak.
    ///
    /// Walks backward from yesterday. Days on which the habit is not
    /// applicable are skipped without breaking the run; the first applicable
    /// day that is not complete ends it. An incomplete today never breaks
    /// the streak, a complete today extends it by one.
    pub fn recompute(&self, habit: &Habit, today: NaiveDate) -> StreakUpdate {
        let floor = creation_day(habit, &self.tz);
        let mut count: u32 = 0;
        let mut cursor = today.pred_opt();

        while let Some(day) = cursor.filter(|d| *d >= floor) {
            if is_applicable(habit, day, &self.tz) {
                if !is_day_complete(habit, day) {
                    break;
                }
                count += 1;
            }
            cursor = day.pred_opt();
        }

        let streak = if is_day_complete(habit, today) {
            count + 1
        } else {
            count
        };

        StreakUpdate {
            streak,
            best_streak: habit.best_streak.max(streak),
        }
    }

    /// Toggle today's completion and refresh the cached streaks.
    ///
    /// Counted habits increment by one until the target is reached; a
    /// further toggle clears the day entirely rather than decrementing.
    /// Every other frequency flips between `true` and no record.
    pub fn toggle(&self, habit: &mut Habit, today: NaiveDate) -> ToggleOutcome {
        let key = date_key(today);
        let previous = habit.history.get(&key).copied();

        let current = if habit.frequency.is_counted() {
            // A legacy `true` already meets the target, so it clears too.
            let count = previous.map(|v| v.count()).unwrap_or(0);
            if day_completion_fraction(habit, previous.as_ref()) >= 1.0 {
                None
            } else {
                Some(HistoryValue::Count(count + 1))
            }
        } else if previous.is_some_and(|v| v.is_truthy()) {
            None
        } else {
            Some(HistoryValue::Done)
        };

        match current {
            Some(value) => {
                habit.history.insert(key.clone(), value);
            }
            None => {
                habit.history.remove(&key);
            }
        }

        let streak = self.recompute(habit, today);
        habit.streak = streak.streak;
        habit.best_streak = streak.best_streak;

        tracing::debug!(
            habit = %habit.id,
            day = %key,
            ?previous,
            ?current,
            streak = streak.streak,
            best = streak.best_streak,
            "toggled habit"
        );

        ToggleOutcome {
            date_key: key,
            previous,
            current,
            streak,
        }
    }

    /// Longest run of complete applicable days found in the history up to
    /// and including `until`.
    pub fn longest_run(&self, habit: &Habit, until: NaiveDate) -> u32 {
        let Some(first) = habit
            .history
            .keys()
            .find_map(|key| parse_date_key(key).ok())
        else {
            return 0;
        };
        let start = first.max(creation_day(habit, &self.tz));

        let mut best = 0;
        let mut run = 0;
        for day in days_in_range(start, until) {
            if !is_applicable(habit, day, &self.tz) {
                continue;
            }
            if is_day_complete(habit, day) {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    /// Rebuild cached streaks from history alone, e.g. after an import.
    ///
    /// The best streak never decreases.
    pub fn resync(&self, habit: &mut Habit, today: NaiveDate) -> StreakUpdate {
        let mut update = self.recompute(habit, today);
        update.best_streak = update.best_streak.max(self.longest_run(habit, today));
        habit.streak = update.streak;
        habit.best_streak = update.best_streak;
        update
    }
}

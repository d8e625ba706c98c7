//! Life-sphere balance.
//!
//! For each day of a trailing window, every sphere scores
//! `100 * done / total` over the habits, tasks and journal entries tagged
//! with it that day. A sphere's balance is the mean of its daily scores,
//! taken only over days on which it had anything tagged; quiet days do not
//! drag an otherwise active sphere toward zero.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::activity::{JournalEntry, TaskRecord};
use crate::date_key::days_in_range;
use crate::habit::{is_applicable, is_day_complete, Habit};

/// Balance of one sphere over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereScore {
    pub sphere: String,
    /// Mean daily score, 0-100
    pub score: f64,
    /// Days in the window on which the sphere had tagged items
    pub active_days: u32,
}

/// Balance across all spheres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereBalance {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Sorted by sphere name
    pub spheres: Vec<SphereScore>,
}

impl SphereBalance {
    pub fn get(&self, sphere: &str) -> Option<&SphereScore> {
        self.spheres.iter().find(|s| s.sphere == sphere)
    }

    /// Lowest-scoring active sphere, the one most in need of attention.
    pub fn weakest(&self) -> Option<&SphereScore> {
        self.spheres
            .iter()
            .filter(|s| s.active_days > 0)
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[derive(Default)]
struct Tally {
    done: u32,
    total: u32,
}

#[derive(Default)]
struct Accumulator {
    score_sum: f64,
    active_days: u32,
}

/// Sphere balance analyzer.
pub struct SphereBalanceAnalyzer {
    /// Trailing window length in days, including the reference day
    pub window_days: u32,
    /// Spheres always reported, even with no tagged items
    pub known_spheres: Vec<String>,
}

impl Default for SphereBalanceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SphereBalanceAnalyzer {
    pub fn new() -> Self {
        Self {
            window_days: 7,
            known_spheres: Vec::new(),
        }
    }

    pub fn with_window(mut self, days: u32) -> Self {
        self.window_days = days.max(1);
        self
    }

    pub fn with_known_spheres(mut self, spheres: Vec<String>) -> Self {
        self.known_spheres = spheres;
        self
    }

    /// Compute the balance for the window ending at `reference`.
    pub fn analyze<Tz: TimeZone>(
        &self,
        habits: &[Habit],
        tasks: &[TaskRecord],
        journal: &[JournalEntry],
        reference: NaiveDate,
        tz: &Tz,
    ) -> SphereBalance {
        let window_start = reference - Duration::days(self.window_days.max(1) as i64 - 1);

        let mut totals: BTreeMap<String, Accumulator> = self
            .known_spheres
            .iter()
            .map(|s| (s.clone(), Accumulator::default()))
            .collect();

        for day in days_in_range(window_start, reference) {
            let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

            for habit in habits.iter().filter(|h| is_applicable(h, day, tz)) {
                let done = is_day_complete(habit, day);
                for sphere in &habit.spheres {
                    let tally = tallies.entry(sphere.as_str()).or_default();
                    tally.total += 1;
                    if done {
                        tally.done += 1;
                    }
                }
            }

            for task in tasks.iter().filter(|t| t.activity_day(tz) == day) {
                for sphere in &task.spheres {
                    let tally = tallies.entry(sphere.as_str()).or_default();
                    tally.total += 1;
                    if task.is_done() {
                        tally.done += 1;
                    }
                }
            }

            // Writing an entry is itself the completed activity.
            for entry in journal.iter().filter(|e| e.activity_day(tz) == day) {
                for sphere in &entry.spheres {
                    let tally = tallies.entry(sphere.as_str()).or_default();
                    tally.total += 1;
                    tally.done += 1;
                }
            }

            for (sphere, tally) in tallies {
                if tally.total == 0 {
                    continue;
                }
                let acc = totals.entry(sphere.to_string()).or_default();
                acc.score_sum += 100.0 * tally.done as f64 / tally.total as f64;
                acc.active_days += 1;
            }
        }

        let spheres = totals
            .into_iter()
            .map(|(sphere, acc)| SphereScore {
                sphere,
                score: if acc.active_days == 0 {
                    0.0
                } else {
                    acc.score_sum / acc.active_days as f64
                },
                active_days: acc.active_days,
            })
            .collect();

        SphereBalance {
            window_start,
            window_end: reference,
            spheres,
        }
    }
}

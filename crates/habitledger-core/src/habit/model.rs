//! Habit records and their persisted history shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date_key::date_key;
use crate::error::ValidationError;

/// Recurrence policy of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Expected every day
    Daily,
    /// Expected only on the weekdays listed in `target_days`
    SpecificDays,
    /// `target_count` completions across a Monday-anchored week
    TimesPerWeek,
    /// `target_count` repetitions within a single day
    TimesPerDay,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::SpecificDays => "specific_days",
            Frequency::TimesPerWeek => "times_per_week",
            Frequency::TimesPerDay => "times_per_day",
        }
    }

    /// Whether this frequency stores repetition counts rather than booleans.
    pub fn is_counted(&self) -> bool {
        matches!(self, Frequency::TimesPerDay)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "daily" => Ok(Frequency::Daily),
            "specific_days" => Ok(Frequency::SpecificDays),
            "times_per_week" => Ok(Frequency::TimesPerWeek),
            "times_per_day" => Ok(Frequency::TimesPerDay),
            _ => Err(ValidationError::UnknownFrequency(s.to_string())),
        }
    }
}

/// One day's recorded value.
///
/// Persisted as the bare JSON `boolean | number` the rest of the app already
/// stores, so `true`, `false` and `3` round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryValue {
    /// `true`
    Done,
    /// `false`; legacy records only, never written by the ledger
    NotDone,
    /// Repetition count for the day
    Count(u32),
}

impl HistoryValue {
    /// JavaScript-style truthiness of the stored value.
    pub fn is_truthy(&self) -> bool {
        match self {
            HistoryValue::Done => true,
            HistoryValue::NotDone => false,
            HistoryValue::Count(n) => *n > 0,
        }
    }

    /// Count view: `Done` counts as one repetition, `NotDone` as none.
    pub fn count(&self) -> u32 {
        match self {
            HistoryValue::Done => 1,
            HistoryValue::NotDone => 0,
            HistoryValue::Count(n) => *n,
        }
    }
}

impl Serialize for HistoryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HistoryValue::Done => serializer.serialize_bool(true),
            HistoryValue::NotDone => serializer.serialize_bool(false),
            HistoryValue::Count(n) => serializer.serialize_u32(*n),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHistoryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for HistoryValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawHistoryValue::deserialize(deserializer)? {
            RawHistoryValue::Bool(true) => HistoryValue::Done,
            RawHistoryValue::Bool(false) => HistoryValue::NotDone,
            RawHistoryValue::Int(n) => HistoryValue::Count(clamp_count(n)),
            RawHistoryValue::Float(f) => {
                let n = if f.is_finite() { f.floor() as i64 } else { 0 };
                HistoryValue::Count(clamp_count(n))
            }
        })
    }
}

fn clamp_count(n: i64) -> u32 {
    if n < 0 {
        tracing::warn!(value = n, "negative history count clamped to 0");
        0
    } else {
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

/// Date-keyed completion history, ordered by key (and therefore by day).
pub type History = BTreeMap<String, HistoryValue>;

/// A recurring action tracked over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub frequency: Frequency,
    /// Weekday indices (0=Sunday..6=Saturday); used by `SpecificDays` only
    #[serde(default)]
    pub target_days: Vec<u8>,
    /// Threshold for `TimesPerWeek` / `TimesPerDay`; absent means 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u32>,
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    /// Epoch milliseconds
    pub created_at: i64,
    #[serde(default)]
    pub spheres: Vec<String>,
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// Create a habit with empty history and zeroed streaks.
    pub fn new(title: impl Into<String>, frequency: Frequency, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            frequency,
            target_days: Vec::new(),
            target_count: None,
            history: History::new(),
            streak: 0,
            best_streak: 0,
            created_at,
            spheres: Vec::new(),
            archived: false,
        }
    }

    pub fn with_target_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.target_days = days.into_iter().collect();
        self
    }

    pub fn with_target_count(mut self, count: u32) -> Self {
        self.target_count = Some(count);
        self
    }

    pub fn with_spheres<S: Into<String>>(mut self, spheres: impl IntoIterator<Item = S>) -> Self {
        self.spheres = spheres.into_iter().map(Into::into).collect();
        self
    }

    /// Effective target; a missing or zero target behaves as 1.
    pub fn target(&self) -> u32 {
        self.target_count.unwrap_or(1).max(1)
    }

    /// Stored value for `date`, if any.
    pub fn value_on(&self, date: NaiveDate) -> Option<&HistoryValue> {
        self.history.get(&date_key(date))
    }

    // Configuration edits replace settings and never migrate history.

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_frequency(&mut self, frequency: Frequency) {
        self.frequency = frequency;
    }

    pub fn set_target_days(&mut self, days: Vec<u8>) {
        self.target_days = days;
    }

    pub fn set_target_count(&mut self, count: Option<u32>) {
        self.target_count = count;
    }

    pub fn set_spheres(&mut self, spheres: Vec<String>) {
        self.spheres = spheres;
    }
}

/// Validate and deduplicate weekday indices supplied by a caller.
///
/// # Errors
/// Returns [`ValidationError::WeekdayOutOfRange`] for any index above 6.
pub fn normalize_target_days(days: &[u8]) -> Result<Vec<u8>, ValidationError> {
    let mut out = Vec::with_capacity(days.len());
    for &day in days {
        if day > 6 {
            return Err(ValidationError::WeekdayOutOfRange(day));
        }
        if !out.contains(&day) {
            out.push(day);
        }
    }
    out.sort_unstable();
    Ok(out)
}

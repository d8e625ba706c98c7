//! Task and journal records owned by the surrounding app.
//!
//! The ledger only reads their sphere tags and dates for the sphere balance;
//! it never mutates them.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::date_key::local_day;

/// A to-do item tagged with life spheres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub spheres: Vec<String>,
    /// Day the task is planned for; falls back to the creation day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl TaskRecord {
    pub fn new(title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            spheres: Vec::new(),
            due: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Calendar day the task counts toward.
    pub fn activity_day<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.due.unwrap_or_else(|| local_day(self.created_at, tz))
    }
}

/// A journal entry tagged with life spheres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    /// Epoch milliseconds
    pub created_at: i64,
    #[serde(default)]
    pub spheres: Vec<String>,
    #[serde(default)]
    pub text: String,
    /// 1-5 mood rating, if the entry logged one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
}

impl JournalEntry {
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            spheres: Vec::new(),
            text: text.into(),
            mood: None,
        }
    }

    pub fn activity_day<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        local_day(self.created_at, tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_task_day_prefers_due() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap().timestamp_millis();
        let mut task = TaskRecord::new("Call mom", created);
        assert_eq!(task.activity_day(&Utc), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        task.due = NaiveDate::from_ymd_opt(2024, 1, 4);
        assert_eq!(task.activity_day(&Utc), NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert!(!task.is_done());
    }

    #[test]
    fn test_task_json_shape() {
        let task: TaskRecord = serde_json::from_str(
            r#"{"id":"t1","title":"Plan","spheres":["growth"],"createdAt":0,"completedAt":5}"#,
        )
        .unwrap();
        assert!(task.is_done());
        assert_eq!(task.spheres, vec!["growth".to_string()]);
        assert!(task.due.is_none());
    }
}

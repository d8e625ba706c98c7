pub mod config;
pub mod habit;
pub mod journal;
pub mod stats;
pub mod task;

use chrono::{Local, NaiveDate, TimeZone};
use habitledger_core::Config;

/// Per-invocation state shared by every command.
pub struct Context {
    pub today: NaiveDate,
    /// True when `--date` replaced the wall clock
    pub date_overridden: bool,
    pub config: Config,
}

impl Context {
    /// Timestamp for newly created records.
    ///
    /// With `--date` this is local midnight of that day so the record
    /// belongs to the overridden day.
    pub fn now_ms(&self) -> i64 {
        if !self.date_overridden {
            return Local::now().timestamp_millis();
        }
        self.today
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| Local::now().timestamp_millis())
    }
}

/// Trim and drop empty entries from a comma-split list.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

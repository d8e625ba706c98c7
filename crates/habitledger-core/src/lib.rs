//! # Habit Ledger Core Library
//!
//! This library provides the habit-tracking engine behind the Habit Ledger
//! CLI: completion policy, applicability, streaks and the aggregate
//! statistics that feed dashboards.
//!
//! ## Architecture
//!
//! - **Ledger**: pure functions over a caller-supplied snapshot of habits.
//!   "Today" is always a parameter; nothing in the ledger reads the clock.
//! - **Stats**: stateless reducers (daily ring, heatmap, weekly rhythm,
//!   period rollups, sphere balance, per-habit summaries)
//! - **Storage**: SQLite habit collection store and TOML configuration
//!
//! ## Key Components
//!
//! - [`Habit`]: a recurring action and its date-keyed history
//! - [`StreakCalculator`]: streak recomputation and the toggle operation
//! - [`HeatmapAnalyzer`], [`SphereBalanceAnalyzer`]: aggregate views
//! - [`LedgerDb`]: persistence for habits, tasks and journal entries
//! - [`Config`]: application configuration management

pub mod activity;
pub mod date_key;
pub mod error;
pub mod habit;
pub mod stats;
pub mod storage;

pub use activity::{JournalEntry, TaskRecord};
pub use date_key::{date_key, parse_date_key};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{
    day_completion_fraction, is_applicable, Frequency, Habit, HistoryValue, StreakCalculator,
    StreakUpdate, ToggleOutcome,
};
pub use stats::{
    daily_ring, rollup, weekly_rhythm, DailyRing, HabitSummaryAnalyzer, HeatmapAnalyzer,
    HeatmapRange, Period, SphereBalanceAnalyzer,
};
pub use storage::{Config, LedgerDb};

//! Aggregate statistics over a habit collection.
//!
//! Every reducer here is a pure function of its inputs and an explicitly
//! passed reference date. Nothing is cached between calls and nothing reads
//! the system clock, so results can be memoized by the caller.

mod daily_ring;
mod day;
mod heatmap;
mod rollup;
mod sphere_balance;
mod summary;
mod weekly_rhythm;

pub use daily_ring::{daily_ring, DailyRing};
pub use day::{day_rate, DayRate};
pub use heatmap::{intensity_level, Heatmap, HeatmapAnalyzer, HeatmapDay, HeatmapRange};
pub use rollup::{rollup, Period, Rollup, RollupBucket};
pub use sphere_balance::{SphereBalance, SphereBalanceAnalyzer, SphereScore};
pub use summary::{HabitSummary, HabitSummaryAnalyzer};
pub use weekly_rhythm::{weekly_rhythm, RhythmDay, WeeklyRhythm};

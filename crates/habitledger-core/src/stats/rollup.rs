//! Weekly, monthly and yearly completion buckets.
//!
//! A week rolls up into seven day buckets, a month into one bucket per day,
//! a year into twelve month buckets. Each bucket is weighted by habit-days:
//! `100 * Σfraction / Σapplicable` over its days. Days after the reference
//! date have not happened yet and are left out.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::day::day_rate;
use super::heatmap::HeatmapRange;
use crate::date_key::days_in_range;
use crate::error::ValidationError;
use crate::habit::Habit;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Roll-up granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        })
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(ValidationError::InvalidValue {
                field: "period".into(),
                message: format!("'{s}' is not one of week, month, year"),
            }),
        }
    }
}

/// Aggregated completion over a span of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupBucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Applicable habit-days counted (days up to the reference date only)
    pub applicable: u32,
    pub completed: u32,
    pub fraction_sum: f64,
    pub percent: f64,
}

impl RollupBucket {
    fn collect<Tz: TimeZone>(
        label: String,
        start: NaiveDate,
        end: NaiveDate,
        habits: &[Habit],
        reference: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let mut bucket = RollupBucket {
            label,
            start,
            end,
            applicable: 0,
            completed: 0,
            fraction_sum: 0.0,
            percent: 0.0,
        };

        for date in days_in_range(start, end.min(reference)) {
            let rate = day_rate(habits, date, tz);
            bucket.applicable += rate.applicable;
            bucket.completed += rate.completed;
            bucket.fraction_sum += rate.fraction_sum;
        }

        bucket.percent = percent(bucket.fraction_sum, bucket.applicable);
        bucket
    }
}

/// All buckets of one period plus the overall rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollup {
    pub period: Period,
    pub reference: NaiveDate,
    pub buckets: Vec<RollupBucket>,
    pub percent: f64,
}

fn percent(fraction_sum: f64, applicable: u32) -> f64 {
    if applicable == 0 {
        0.0
    } else {
        100.0 * fraction_sum / applicable as f64
    }
}

/// Roll up `habits` for the `period` containing `reference`.
pub fn rollup<Tz: TimeZone>(habits: &[Habit], period: Period, reference: NaiveDate, tz: &Tz) -> Rollup {
    let buckets: Vec<RollupBucket> = match period {
        Period::Week | Period::Month => {
            let range = if period == Period::Week {
                HeatmapRange::Week
            } else {
                HeatmapRange::Month
            };
            let (start, end) = range.bounds(reference);
            days_in_range(start, end)
                .map(|day| {
                    let label = if period == Period::Week {
                        day.format("%a").to_string()
                    } else {
                        day.day().to_string()
                    };
                    RollupBucket::collect(label, day, day, habits, reference, tz)
                })
                .collect()
        }
        Period::Year => MONTHS
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| {
                let first = NaiveDate::from_ymd_opt(reference.year(), idx as u32 + 1, 1)?;
                let (start, end) = HeatmapRange::Month.bounds(first);
                Some(RollupBucket::collect(
                    (*label).to_string(),
                    start,
                    end,
                    habits,
                    reference,
                    tz,
                ))
            })
            .collect(),
    };

    let applicable: u32 = buckets.iter().map(|b| b.applicable).sum();
    let fraction_sum: f64 = buckets.iter().map(|b| b.fraction_sum).sum();

    Rollup {
        period,
        reference,
        buckets,
        percent: percent(fraction_sum, applicable),
    }
}

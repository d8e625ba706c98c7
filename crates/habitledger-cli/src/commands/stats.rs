use chrono::Local;
use clap::Subcommand;
use habitledger_core::stats::HeatmapRange;
use habitledger_core::{
    daily_ring, rollup, weekly_rhythm, HabitSummaryAnalyzer, HeatmapAnalyzer, LedgerDb, Period,
    SphereBalanceAnalyzer,
};

use super::Context;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completion ring
    Today,
    /// Daily completion heatmap
    Heatmap {
        /// week, month or year; defaults to stats.heatmap_range
        #[arg(long)]
        range: Option<HeatmapRange>,
        /// Print JSON even when the ASCII view is enabled
        #[arg(long)]
        json: bool,
    },
    /// Completion rate for each day of the current week
    Rhythm,
    /// Completion rate bucketed over a week, month or year
    Rollup {
        #[arg(long, default_value = "week")]
        period: Period,
    },
    /// Balance across life spheres
    Spheres {
        /// Trailing window in days; defaults to stats.sphere_window_days
        #[arg(long)]
        window: Option<u32>,
    },
    /// Per-habit summary over a trailing window
    Summary {
        /// Habit id or title prefix; all habits when omitted
        habit: Option<String>,
    },
}

pub fn run(action: StatsAction, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;
    let habits = db.list_habits(ctx.config.display.show_archived)?;

    match action {
        StatsAction::Today => {
            let ring = daily_ring(&habits, ctx.today, &Local);
            println!("{}", serde_json::to_string_pretty(&ring)?);
        }
        StatsAction::Heatmap { range, json } => {
            let range = range.unwrap_or(ctx.config.stats.heatmap_range);
            let analyzer = HeatmapAnalyzer::new();
            let heatmap = analyzer.build_range(&habits, range, ctx.today);
            if ctx.config.display.ascii_heatmap && !json {
                print!("{}", analyzer.render_ascii(&heatmap));
            } else {
                println!("{}", serde_json::to_string_pretty(&heatmap)?);
            }
        }
        StatsAction::Rhythm => {
            let rhythm = weekly_rhythm(&habits, ctx.today, &Local);
            println!("{}", serde_json::to_string_pretty(&rhythm)?);
        }
        StatsAction::Rollup { period } => {
            let rollup = rollup(&habits, period, ctx.today, &Local);
            println!("{}", serde_json::to_string_pretty(&rollup)?);
        }
        StatsAction::Spheres { window } => {
            let tasks = db.list_tasks()?;
            let journal = db.list_journal_entries(None)?;
            let balance = SphereBalanceAnalyzer::new()
                .with_window(window.unwrap_or(ctx.config.stats.sphere_window_days))
                .with_known_spheres(ctx.config.spheres.known.clone())
                .analyze(&habits, &tasks, &journal, ctx.today, &Local);
            println!("{}", serde_json::to_string_pretty(&balance)?);
        }
        StatsAction::Summary { habit } => {
            let analyzer =
                HabitSummaryAnalyzer::new().with_window(ctx.config.stats.summary_window_days);
            match habit {
                Some(selector) => {
                    let habit = db.find_habit(&selector)?;
                    let summary = analyzer.summarize(&habit, ctx.today);
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                None => {
                    let summaries = analyzer.summarize_all(&habits, ctx.today);
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                }
            }
        }
    }
    Ok(())
}

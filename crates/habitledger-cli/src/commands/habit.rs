//! Habit management commands for CLI.

use std::io::Read;
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;
use habitledger_core::habit::{is_applicable, is_day_complete, normalize_target_days};
use habitledger_core::{Frequency, Habit, LedgerDb, StreakCalculator, ValidationError};

use super::{clean_list, Context};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// daily, specific-days, times-per-week or times-per-day
        #[arg(long, short, default_value = "daily")]
        frequency: Frequency,
        /// Comma-separated weekday indices, 0=Sunday..6=Saturday
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Target count for times-per-week / times-per-day
        #[arg(long)]
        target: Option<u32>,
        /// Comma-separated life spheres
        #[arg(long, value_delimiter = ',')]
        spheres: Vec<String>,
    },
    /// List habits with today's state
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one habit as JSON
    Show {
        /// Habit id or title prefix
        habit: String,
    },
    /// Change a habit's settings; history is kept as-is
    Edit {
        /// Habit id or title prefix
        habit: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        frequency: Option<Frequency>,
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        #[arg(long)]
        target: Option<u32>,
        #[arg(long, value_delimiter = ',')]
        spheres: Option<Vec<String>>,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit id or title prefix
        habit: String,
    },
    /// Toggle today's completion
    Toggle {
        /// Habit id or title prefix
        habit: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Archive a habit, or restore it with --undo
    Archive {
        /// Habit id or title prefix
        habit: String,
        #[arg(long)]
        undo: bool,
    },
    /// Rebuild cached streaks from history
    Repair {
        /// Habit id or title prefix; all habits when omitted
        habit: Option<String>,
    },
    /// Print every habit as JSON
    Export,
    /// Load habits from a JSON export ("-" reads stdin)
    Import {
        file: PathBuf,
        /// Rebuild cached streaks after loading
        #[arg(long)]
        repair: bool,
    },
}

fn validated_days(frequency: Frequency, days: Vec<u8>) -> Result<Vec<u8>, ValidationError> {
    let days = normalize_target_days(&days)?;
    if frequency == Frequency::SpecificDays && days.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "days".to_string(),
            message: "specific-days needs at least one weekday".to_string(),
        });
    }
    Ok(days)
}

fn validated_target(target: Option<u32>) -> Result<Option<u32>, ValidationError> {
    match target {
        Some(0) => Err(ValidationError::InvalidValue {
            field: "target".to_string(),
            message: "must be at least 1".to_string(),
        }),
        other => Ok(other),
    }
}

fn status_mark(habit: &Habit, ctx: &Context) -> char {
    if !is_applicable(habit, ctx.today, &Local) {
        '-'
    } else if is_day_complete(habit, ctx.today) {
        'x'
    } else {
        ' '
    }
}

fn describe(habit: &Habit) -> String {
    match habit.frequency {
        Frequency::SpecificDays => {
            let days = habit
                .target_days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",");
            format!("{} [{days}]", habit.frequency)
        }
        Frequency::TimesPerWeek | Frequency::TimesPerDay => {
            format!("{} x{}", habit.frequency, habit.target())
        }
        Frequency::Daily => habit.frequency.to_string(),
    }
}

fn read_import(file: &PathBuf) -> Result<String, std::io::Error> {
    if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

pub fn run(action: HabitAction, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;
    let calculator = StreakCalculator::new();

    match action {
        HabitAction::Add {
            title,
            frequency,
            days,
            target,
            spheres,
        } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::Empty("title".to_string()).into());
            }
            let mut habit = Habit::new(title, frequency, ctx.now_ms())
                .with_target_days(validated_days(frequency, days)?)
                .with_spheres(clean_list(spheres));
            habit.target_count = validated_target(target)?;
            db.add_habit(&habit)?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { all, json } => {
            let habits = db.list_habits(all || ctx.config.display.show_archived)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet.");
            } else {
                for habit in &habits {
                    println!(
                        "[{}] {:<24} {:<20} streak {:>3}  best {:>3}{}",
                        status_mark(habit, ctx),
                        habit.title,
                        describe(habit),
                        habit.streak,
                        habit.best_streak,
                        if habit.archived { "  (archived)" } else { "" }
                    );
                }
            }
        }
        HabitAction::Show { habit } => {
            let habit = db.find_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Edit {
            habit,
            title,
            frequency,
            days,
            target,
            spheres,
        } => {
            let mut habit = db.find_habit(&habit)?;
            if let Some(title) = title {
                habit.set_title(title.trim());
            }
            if let Some(frequency) = frequency {
                habit.set_frequency(frequency);
            }
            if let Some(days) = days {
                habit.set_target_days(validated_days(habit.frequency, days)?);
            } else if habit.frequency == Frequency::SpecificDays {
                validated_days(habit.frequency, habit.target_days.clone())?;
            }
            if let Some(target) = target {
                habit.set_target_count(validated_target(Some(target))?);
            }
            if let Some(spheres) = spheres {
                habit.set_spheres(clean_list(spheres));
            }
            let update = calculator.recompute(&habit, ctx.today);
            habit.streak = update.streak;
            habit.best_streak = update.best_streak;
            db.update_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { habit } => {
            let habit = db.find_habit(&habit)?;
            db.delete_habit(&habit.id)?;
            println!("Habit deleted: {}", habit.title);
        }
        HabitAction::Toggle { habit, json } => {
            let mut habit = db.find_habit(&habit)?;
            let outcome = calculator.toggle(&mut habit, ctx.today);
            db.update_habit(&habit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                let state = match outcome.current {
                    None => "cleared".to_string(),
                    Some(value) if habit.frequency.is_counted() => {
                        format!("{}/{}", value.count(), habit.target())
                    }
                    Some(_) => "done".to_string(),
                };
                println!(
                    "{} {}: {} (streak {}, best {})",
                    outcome.date_key,
                    habit.title,
                    state,
                    outcome.streak.streak,
                    outcome.streak.best_streak
                );
            }
        }
        HabitAction::Archive { habit, undo } => {
            let mut habit = db.find_habit(&habit)?;
            habit.archived = !undo;
            db.update_habit(&habit)?;
            let verb = if undo { "restored" } else { "archived" };
            println!("Habit {verb}: {}", habit.title);
        }
        HabitAction::Repair { habit } => {
            let mut targets = match habit {
                Some(selector) => vec![db.find_habit(&selector)?],
                None => db.list_habits(true)?,
            };
            for habit in &mut targets {
                let update = calculator.resync(habit, ctx.today);
                db.update_habit(habit)?;
                println!(
                    "{}: streak {}, best {}",
                    habit.title, update.streak, update.best_streak
                );
            }
        }
        HabitAction::Export => {
            let habits = db.list_habits(true)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Import { file, repair } => {
            let raw = read_import(&file)?;
            let habits: Vec<Habit> = serde_json::from_str(&raw)?;
            let mut added = 0;
            let mut updated = 0;
            for mut habit in habits {
                if repair {
                    calculator.resync(&mut habit, ctx.today);
                }
                if db.get_habit(&habit.id)?.is_some() {
                    db.update_habit(&habit)?;
                    updated += 1;
                } else {
                    db.add_habit(&habit)?;
                    added += 1;
                }
            }
            tracing::info!(added, updated, "imported habits");
            println!("Imported {added} new, {updated} updated");
        }
    }
    Ok(())
}

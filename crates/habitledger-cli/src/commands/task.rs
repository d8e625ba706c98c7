//! Task commands for CLI.
//!
//! Tasks only matter to the ledger as sphere-tagged activity for the
//! sphere balance.

use chrono::Local;
use clap::Subcommand;
use habitledger_core::{parse_date_key, LedgerDb, TaskRecord};

use super::{clean_list, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Due day (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated life spheres
        #[arg(long, value_delimiter = ',')]
        spheres: Vec<String>,
    },
    /// Mark a task as done
    Complete {
        /// Task ID
        id: String,
    },
    /// List tasks
    List {
        /// Only tasks due today
        #[arg(long)]
        today: bool,
    },
}

pub fn run(action: TaskAction, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;

    match action {
        TaskAction::Add { title, due, spheres } => {
            let mut task = TaskRecord::new(title.trim(), ctx.now_ms());
            task.due = due.as_deref().map(parse_date_key).transpose()?;
            task.spheres = clean_list(spheres);
            db.add_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Complete { id } => {
            db.complete_task(&id, ctx.now_ms())?;
            println!("Task completed: {id}");
        }
        TaskAction::List { today } => {
            let tasks = if today {
                db.tasks_due(ctx.today, &Local)?
            } else {
                db.list_tasks()?
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
    }
    Ok(())
}

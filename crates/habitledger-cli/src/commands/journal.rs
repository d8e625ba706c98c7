use chrono::Local;
use clap::Subcommand;
use habitledger_core::{parse_date_key, JournalEntry, LedgerDb, ValidationError};

use super::{clean_list, Context};

#[derive(Subcommand)]
pub enum JournalAction {
    /// Write a journal entry
    Add {
        text: String,
        /// Comma-separated life spheres
        #[arg(long, value_delimiter = ',')]
        spheres: Vec<String>,
        /// Mood from 1 to 5
        #[arg(long)]
        mood: Option<u8>,
    },
    /// List journal entries
    List {
        /// Only entries from this day (YYYY-MM-DD) onwards
        #[arg(long)]
        since: Option<String>,
    },
}

pub fn run(action: JournalAction, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;

    match action {
        JournalAction::Add {
            text,
            spheres,
            mood,
        } => {
            if let Some(mood) = mood.filter(|m| !(1..=5).contains(m)) {
                return Err(ValidationError::InvalidValue {
                    field: "mood".to_string(),
                    message: format!("{mood} is outside 1..=5"),
                }
                .into());
            }
            let mut entry = JournalEntry::new(text, ctx.now_ms());
            entry.spheres = clean_list(spheres);
            entry.mood = mood;
            db.add_journal_entry(&entry)?;
            println!("Journal entry created: {}", entry.id);
        }
        JournalAction::List { since } => {
            let since_ms = match since.as_deref() {
                Some(raw) => {
                    let day = parse_date_key(raw)?;
                    day.and_hms_opt(0, 0, 0)
                        .and_then(|naive| naive.and_local_timezone(Local).earliest())
                        .map(|dt| dt.timestamp_millis())
                }
                None => None,
            };
            let entries = db.list_journal_entries(since_ms)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

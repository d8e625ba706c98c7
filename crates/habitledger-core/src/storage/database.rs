//! SQLite-based habit collection store.
//!
//! Provides persistent storage for:
//! - Habits, including their date-keyed history and cached streaks
//! - Tasks and journal entries consumed by the sphere balance
//!
//! The store never computes streaks itself; callers run the ledger and pass
//! the updated records back through [`LedgerDb::update_habit`].

use std::path::Path;

use chrono::{NaiveDate, TimeZone};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;

use super::{data_dir, migrations};
use crate::activity::{JournalEntry, TaskRecord};
use crate::date_key::{date_key, parse_date_key};
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{Frequency, Habit};

const HABIT_COLUMNS: &str = "id, title, frequency, target_days, target_count, history, \
                             streak, best_streak, created_at, spheres, archived";

/// SQLite database for habits, tasks and journal entries.
pub struct LedgerDb {
    conn: Connection,
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a row-decoding failure to [`DatabaseError::CorruptRow`].
fn decode_error(table: &str, err: rusqlite::Error) -> CoreError {
    if !matches!(
        err,
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..)
    ) {
        return err.into();
    }
    tracing::warn!(table, error = %err, "corrupt row");
    DatabaseError::CorruptRow {
        table: table.to_string(),
        message: err.to_string(),
    }
    .into()
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let frequency: String = row.get(2)?;
    let frequency: Frequency = frequency
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Habit {
        id: row.get(0)?,
        title: row.get(1)?,
        frequency,
        target_days: json_column(row, 3)?,
        target_count: row.get(4)?,
        history: json_column(row, 5)?,
        streak: row.get(6)?,
        best_streak: row.get(7)?,
        created_at: row.get(8)?,
        spheres: json_column(row, 9)?,
        archived: row.get(10)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    let due: Option<String> = row.get(3)?;
    let due = due
        .map(|key| parse_date_key(&key))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(TaskRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        spheres: json_column(row, 2)?,
        due,
        created_at: row.get(4)?,
        completed_at: row.get(5)?,
    })
}

fn journal_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        created_at: row.get(1)?,
        spheres: json_column(row, 2)?,
        text: row.get(3)?,
        mood: row.get(4)?,
    })
}

impl LedgerDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitledger/habitledger.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitledger.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "ledger database ready");
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()).into())
    }

    // ── Habits ──────────────────────────────────────────────────────

    /// Insert a new habit.
    ///
    /// # Errors
    /// Returns an error if the insert fails (e.g. duplicate id).
    pub fn add_habit(&self, habit: &Habit) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO habits ({HABIT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                habit.id,
                habit.title,
                habit.frequency.as_str(),
                serde_json::to_string(&habit.target_days)?,
                habit.target_count,
                serde_json::to_string(&habit.history)?,
                habit.streak,
                habit.best_streak,
                habit.created_at,
                serde_json::to_string(&habit.spheres)?,
                habit.archived,
            ],
        )?;
        tracing::info!(habit = %habit.id, title = %habit.title, "habit added");
        Ok(())
    }

    /// Replace a stored habit with `habit`.
    ///
    /// # Errors
    /// Returns [`CoreError::HabitNotFound`] if no habit has this id.
    pub fn update_habit(&self, habit: &Habit) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits SET title = ?2, frequency = ?3, target_days = ?4, target_count = ?5,
                    history = ?6, streak = ?7, best_streak = ?8, created_at = ?9,
                    spheres = ?10, archived = ?11
             WHERE id = ?1",
            params![
                habit.id,
                habit.title,
                habit.frequency.as_str(),
                serde_json::to_string(&habit.target_days)?,
                habit.target_count,
                serde_json::to_string(&habit.history)?,
                habit.streak,
                habit.best_streak,
                habit.created_at,
                serde_json::to_string(&habit.spheres)?,
                habit.archived,
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::HabitNotFound(habit.id.clone()));
        }
        tracing::info!(habit = %habit.id, streak = habit.streak, "habit updated");
        Ok(())
    }

    /// Delete a habit and its history.
    ///
    /// # Errors
    /// Returns [`CoreError::HabitNotFound`] if no habit has this id.
    pub fn delete_habit(&self, id: &str) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM habits WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CoreError::HabitNotFound(id.to_string()));
        }
        tracing::info!(habit = %id, "habit deleted");
        Ok(())
    }

    /// Fetch a habit by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let habit = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                [id],
                habit_from_row,
            )
            .optional()
            .map_err(|e| decode_error("habits", e))?;
        Ok(habit)
    }

    /// Resolve a habit by exact id, or by a case-insensitive title prefix
    /// that matches exactly one habit.
    ///
    /// # Errors
    /// Returns [`CoreError::HabitNotFound`] when nothing or more than one
    /// habit matches.
    pub fn find_habit(&self, selector: &str) -> Result<Habit> {
        let selector = selector.trim();
        if let Some(habit) = self.get_habit(selector)? {
            return Ok(habit);
        }

        let prefix = selector.to_lowercase();
        let mut matches: Vec<Habit> = self
            .list_habits(true)?
            .into_iter()
            .filter(|h| !prefix.is_empty() && h.title.to_lowercase().starts_with(&prefix))
            .collect();

        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(CoreError::HabitNotFound(selector.to_string())),
            _ => {
                let candidates = matches
                    .iter()
                    .map(|h| format!("{} ({})", h.title, h.id))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(CoreError::HabitNotFound(format!(
                    "'{selector}' is ambiguous: {candidates}"
                )))
            }
        }
    }

    /// All habits, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE archived = 0 OR ?1
             ORDER BY created_at ASC, id ASC"
        ))?;
        let habits = stmt
            .query_map([include_archived], habit_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| decode_error("habits", e))?;
        Ok(habits)
    }

    // ── Tasks ───────────────────────────────────────────────────────

    /// Insert a task.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn add_task(&self, task: &TaskRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, spheres, due, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id,
                task.title,
                serde_json::to_string(&task.spheres)?,
                task.due.map(date_key),
                task.created_at,
                task.completed_at,
            ],
        )?;
        tracing::info!(task = %task.id, "task added");
        Ok(())
    }

    /// Mark a task complete at `completed_at` (epoch ms).
    ///
    /// # Errors
    /// Returns [`CoreError::TaskNotFound`] if no task has this id.
    pub fn complete_task(&self, id: &str, completed_at: i64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed_at = ?2 WHERE id = ?1",
            params![id, completed_at],
        )?;
        if changed == 0 {
            return Err(CoreError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    /// All tasks, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, spheres, due, created_at, completed_at
             FROM tasks ORDER BY created_at ASC, id ASC",
        )?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| decode_error("tasks", e))?;
        Ok(tasks)
    }

    /// Tasks planned for `day`: by due date, or by creation day in `tz`
    /// when undated.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn tasks_due<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Result<Vec<TaskRecord>> {
        let tasks = self
            .list_tasks()?
            .into_iter()
            .filter(|task| task.activity_day(tz) == day)
            .collect();
        Ok(tasks)
    }

    // ── Journal ─────────────────────────────────────────────────────

    /// Insert a journal entry.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn add_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO journal_entries (id, created_at, spheres, text, mood)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id,
                entry.created_at,
                serde_json::to_string(&entry.spheres)?,
                entry.text,
                entry.mood,
            ],
        )?;
        tracing::info!(entry = %entry.id, "journal entry added");
        Ok(())
    }

    /// Journal entries created at or after `since` (epoch ms), oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_journal_entries(&self, since: Option<i64>) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, spheres, text, mood FROM journal_entries
             WHERE created_at >= ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let entries = stmt
            .query_map([since.unwrap_or(i64::MIN)], journal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| decode_error("journal_entries", e))?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HistoryValue;

    fn sample_habit() -> Habit {
        let mut habit = Habit::new("Pushups", Frequency::TimesPerDay, 1_704_067_200_000)
            .with_target_count(3)
            .with_spheres(["health"]);
        habit.history.insert("2024-01-01".into(), HistoryValue::Count(2));
        habit.history.insert("2024-01-02".into(), HistoryValue::Done);
        habit
    }

    #[test]
    fn test_add_and_get_habit_roundtrip() {
        let db = LedgerDb::open_memory().unwrap();
        let habit = sample_habit();
        db.add_habit(&habit).unwrap();

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded, habit);
        assert_eq!(loaded.history["2024-01-01"], HistoryValue::Count(2));
        assert_eq!(loaded.history["2024-01-02"], HistoryValue::Done);
    }

    #[test]
    fn test_history_stored_in_wire_shape() {
        let db = LedgerDb::open_memory().unwrap();
        let habit = sample_habit();
        db.add_habit(&habit).unwrap();

        let raw: String = db
            .conn()
            .query_row("SELECT history FROM habits WHERE id = ?1", [&habit.id], |r| r.get(0))
            .unwrap();
        assert_eq!(raw, r#"{"2024-01-01":2,"2024-01-02":true}"#);
    }

    #[test]
    fn test_update_and_delete_missing_habit() {
        let db = LedgerDb::open_memory().unwrap();
        let habit = sample_habit();
        assert!(matches!(db.update_habit(&habit), Err(CoreError::HabitNotFound(_))));
        assert!(matches!(db.delete_habit(&habit.id), Err(CoreError::HabitNotFound(_))));
    }

    #[test]
    fn test_update_persists_streaks() {
        let db = LedgerDb::open_memory().unwrap();
        let mut habit = sample_habit();
        db.add_habit(&habit).unwrap();

        habit.streak = 4;
        habit.best_streak = 9;
        habit.history.remove("2024-01-02");
        db.update_habit(&habit).unwrap();

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.streak, 4);
        assert_eq!(loaded.best_streak, 9);
        assert_eq!(loaded.history.len(), 1);
    }

    #[test]
    fn test_list_hides_archived_by_default() {
        let db = LedgerDb::open_memory().unwrap();
        let active = Habit::new("Read", Frequency::Daily, 1);
        let mut archived = Habit::new("Old", Frequency::Daily, 2);
        archived.archived = true;
        db.add_habit(&active).unwrap();
        db.add_habit(&archived).unwrap();

        assert_eq!(db.list_habits(false).unwrap().len(), 1);
        assert_eq!(db.list_habits(true).unwrap().len(), 2);
    }

    #[test]
    fn test_find_habit_by_prefix() {
        let db = LedgerDb::open_memory().unwrap();
        db.add_habit(&Habit::new("Read a book", Frequency::Daily, 1)).unwrap();
        db.add_habit(&Habit::new("Run", Frequency::Daily, 2)).unwrap();
        db.add_habit(&Habit::new("Meditate", Frequency::Daily, 3)).unwrap();

        assert_eq!(db.find_habit("med").unwrap().title, "Meditate");
        assert_eq!(db.find_habit("REA").unwrap().title, "Read a book");
        assert!(db.find_habit("r").is_err());
        assert!(db.find_habit("swim").is_err());
    }

    #[test]
    fn test_undecodable_history_is_corrupt_row() {
        let db = LedgerDb::open_memory().unwrap();
        let habit = sample_habit();
        db.add_habit(&habit).unwrap();
        db.conn()
            .execute("UPDATE habits SET history = 'not json' WHERE id = ?1", [&habit.id])
            .unwrap();

        assert!(matches!(
            db.get_habit(&habit.id),
            Err(CoreError::Database(DatabaseError::CorruptRow { ref table, .. })) if table == "habits"
        ));
        assert!(matches!(
            db.list_habits(true),
            Err(CoreError::Database(DatabaseError::CorruptRow { .. }))
        ));
    }

    #[test]
    fn test_tasks_due_includes_undated_by_creation_day() {
        let db = LedgerDb::open_memory().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        // 2024-01-05T10:00:00Z
        let undated = TaskRecord::new("Water plants", 1_704_448_800_000);
        db.add_task(&undated).unwrap();
        let mut later = TaskRecord::new("Taxes", 1_704_448_800_000);
        later.due = NaiveDate::from_ymd_opt(2024, 4, 15);
        db.add_task(&later).unwrap();

        let due = db.tasks_due(day, &chrono::Utc).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, undated.id);
        let april = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        assert_eq!(db.tasks_due(april, &chrono::Utc).unwrap().len(), 1);
    }

    #[test]
    fn test_tasks_and_journal() {
        let db = LedgerDb::open_memory().unwrap();
        let mut task = TaskRecord::new("Call", 10);
        task.due = NaiveDate::from_ymd_opt(2024, 1, 5);
        task.spheres = vec!["relationships".into()];
        db.add_task(&task).unwrap();
        db.complete_task(&task.id, 20).unwrap();
        assert!(matches!(db.complete_task("nope", 1), Err(CoreError::TaskNotFound(_))));

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].completed_at, Some(20));
        assert_eq!(tasks[0].due, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(
            db.tasks_due(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), &chrono::Utc)
                .unwrap()
                .len(),
            1
        );

        let mut entry = JournalEntry::new("Calm day", 100);
        entry.mood = Some(4);
        db.add_journal_entry(&entry).unwrap();
        assert_eq!(db.list_journal_entries(None).unwrap(), vec![entry]);
        assert!(db.list_journal_entries(Some(101)).unwrap().is_empty());
    }

    #[test]
    fn test_open_at_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let habit = sample_habit();
        {
            let db = LedgerDb::open_at(&path).unwrap();
            db.add_habit(&habit).unwrap();
        }
        let db = LedgerDb::open_at(&path).unwrap();
        assert_eq!(db.get_habit(&habit.id).unwrap().unwrap(), habit);
    }
}

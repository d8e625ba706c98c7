//! Database schema migrations for habitledger.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: habits.
///
/// History, target days and spheres are JSON text so the persisted
/// `boolean | number` history shape is stored verbatim.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            frequency    TEXT NOT NULL,
            target_days  TEXT NOT NULL DEFAULT '[]',
            target_count INTEGER,
            history      TEXT NOT NULL DEFAULT '{}',
            streak       INTEGER NOT NULL DEFAULT 0,
            best_streak  INTEGER NOT NULL DEFAULT 0,
            created_at   INTEGER NOT NULL,
            spheres      TEXT NOT NULL DEFAULT '[]',
            archived     INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_habits_created_at ON habits(created_at);",
    )?;
    set_schema_version(conn, 1)?;
    tracing::info!("applied migration v1 (habits)");
    Ok(())
}

/// Migration v2: tasks and journal entries feeding the sphere balance.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            spheres      TEXT NOT NULL DEFAULT '[]',
            due          TEXT,
            created_at   INTEGER NOT NULL,
            completed_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS journal_entries (
            id         TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            spheres    TEXT NOT NULL DEFAULT '[]',
            text       TEXT NOT NULL DEFAULT '',
            mood       INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_due ON tasks(due);
        CREATE INDEX IF NOT EXISTS idx_journal_created_at ON journal_entries(created_at);",
    )?;
    set_schema_version(conn, 2)?;
    tracing::info!("applied migration v2 (tasks, journal_entries)");
    Ok(())
}

//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- Append-only log of finished focus sessions. Rows are never updated
    -- or deleted; all statistics are derived by reading ranges back out.
    CREATE TABLE IF NOT EXISTS focus_sessions (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        activity      TEXT NOT NULL,
        mode          TEXT NOT NULL,
        started_at    DATETIME NOT NULL,
        duration_secs INTEGER NOT NULL CHECK (duration_secs >= 0),
        completed     INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_focus_sessions_started_at
        ON focus_sessions(started_at);

    -- At most one row: the serialized live tracker, persisted between
    -- process invocations and cleared when the session ends.
    CREATE TABLE IF NOT EXISTS tracker_state (
        id               INTEGER PRIMARY KEY CHECK (id = 1),
        activity         TEXT NOT NULL,
        mode             TEXT NOT NULL,
        target_secs      INTEGER,
        started_at       DATETIME NOT NULL,
        accumulated_secs INTEGER NOT NULL,
        run_started_at   DATETIME,
        updated_at       DATETIME NOT NULL
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::debug!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

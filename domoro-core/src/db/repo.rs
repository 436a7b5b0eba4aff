//! Database repository layer
//!
//! Insert and range-query operations for finished focus sessions, plus
//! persistence for the live tracker state. Sessions are append-only: a
//! record is inserted exactly once when a session ends and never touched
//! again.

use crate::error::{Error, Result};
use crate::period::Period;
use crate::tracker::TrackerSnapshot;
use crate::types::FocusSession;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Database handle (single connection, single writer)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Session operations
    // ============================================

    /// Append a finished session and assign its row ID.
    ///
    /// A failed insert leaves the record untouched, so the caller can retry
    /// with the same value or surface the error to the user.
    pub fn insert_session(&self, session: &mut FocusSession) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO focus_sessions (activity, mode, started_at, duration_secs, completed)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                session.activity.as_str(),
                session.mode.as_str(),
                session.started_at.to_rfc3339(),
                session.duration_secs,
                session.completed as i32,
            ],
        )?;
        session.id = Some(conn.last_insert_rowid());

        tracing::info!(
            id = session.id,
            activity = %session.activity,
            duration_secs = session.duration_secs,
            completed = session.completed,
            "Session saved"
        );
        Ok(())
    }

    /// Sessions whose `started_at` falls in the half-open window `[start, end)`,
    /// ordered by start time.
    pub fn sessions_in(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, activity, mode, started_at, duration_secs, completed
            FROM focus_sessions
            WHERE started_at >= ?1 AND started_at < ?2
            ORDER BY started_at
            "#,
        )?;

        let sessions = stmt
            .query_map(
                params![start.to_rfc3339(), end.to_rfc3339()],
                Self::row_to_session,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// Sessions in the calendar window of `period` containing `anchor`.
    ///
    /// The window comes from [`Period::window`], the same boundary function
    /// the display layer uses for its labels.
    pub fn sessions_in_period(
        &self,
        period: Period,
        anchor: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>> {
        let (start, end) = period.window(anchor);
        self.sessions_in(start, end)
    }

    /// Total number of persisted sessions.
    pub fn session_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM focus_sessions", [], |r| r.get(0))?;
        Ok(count)
    }

    fn row_to_session(row: &Row) -> rusqlite::Result<FocusSession> {
        let activity_str: String = row.get("activity")?;
        let mode_str: String = row.get("mode")?;
        let started_at_str: String = row.get("started_at")?;

        Ok(FocusSession {
            id: Some(row.get("id")?),
            activity: parse_text_column(&activity_str, 1)?,
            mode: parse_text_column(&mode_str, 2)?,
            started_at: parse_timestamp(&started_at_str, 3)?,
            duration_secs: row.get("duration_secs")?,
            completed: row.get::<_, i64>("completed")? != 0,
        })
    }

    // ============================================
    // Tracker state operations
    // ============================================

    /// Persist the live tracker so the session survives process restarts.
    /// The table holds at most one row; writing replaces any previous state.
    pub fn save_tracker_state(&self, snapshot: &TrackerSnapshot) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO tracker_state
                (id, activity, mode, target_secs, started_at, accumulated_secs,
                 run_started_at, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                activity = excluded.activity,
                mode = excluded.mode,
                target_secs = excluded.target_secs,
                started_at = excluded.started_at,
                accumulated_secs = excluded.accumulated_secs,
                run_started_at = excluded.run_started_at,
                updated_at = excluded.updated_at
            "#,
            params![
                snapshot.activity.as_str(),
                snapshot.mode.as_str(),
                snapshot.target_secs,
                snapshot.started_at.to_rfc3339(),
                snapshot.accumulated_secs,
                snapshot.run_started_at.map(|t| t.to_rfc3339()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load the saved tracker state, if a session was in progress.
    pub fn load_tracker_state(&self) -> Result<Option<TrackerSnapshot>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"
            SELECT activity, mode, target_secs, started_at, accumulated_secs, run_started_at
            FROM tracker_state WHERE id = 1
            "#,
            [],
            |row| {
                let activity_str: String = row.get("activity")?;
                let mode_str: String = row.get("mode")?;
                let started_at_str: String = row.get("started_at")?;
                let run_started_str: Option<String> = row.get("run_started_at")?;

                Ok(TrackerSnapshot {
                    activity: parse_text_column(&activity_str, 0)?,
                    mode: parse_text_column(&mode_str, 1)?,
                    target_secs: row.get("target_secs")?,
                    started_at: parse_timestamp(&started_at_str, 3)?,
                    accumulated_secs: row.get("accumulated_secs")?,
                    run_started_at: match run_started_str {
                        Some(s) => Some(parse_timestamp(&s, 5)?),
                        None => None,
                    },
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    /// Remove the saved tracker state once the session has ended.
    pub fn clear_tracker_state(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM tracker_state", [])?;
        Ok(())
    }

    // ============================================
    // Maintenance
    // ============================================

    /// Write a timestamped, consistent copy of the database into `dir`.
    ///
    /// Uses `VACUUM INTO`, which is safe against the live WAL connection.
    pub fn backup(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let dest = dir.join(format!("domoro_backup_{}.db", stamp));

        let conn = self.conn.lock().unwrap();
        conn.execute("VACUUM INTO ?1", [dest.to_string_lossy().to_string()])?;

        tracing::info!(path = %dest.display(), "Database backup written");
        Ok(dest)
    }
}

fn parse_text_column<T>(value: &str, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn parse_timestamp(value: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

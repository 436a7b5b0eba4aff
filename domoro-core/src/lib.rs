//! # domoro-core
//!
//! Core library for domoro - a focus timer with session tracking.
//!
//! This library provides:
//! - The timer/stopwatch tracker state machine
//! - SQLite storage for finished sessions and in-progress tracker state
//! - Calendar period windows and aggregate statistics
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! A single [`Tracker`] holds the in-memory state of the active session and
//! computes elapsed/remaining time on demand from recorded interval
//! boundaries. When a session ends, the tracker hands an immutable
//! [`FocusSession`] record to the [`Database`], which appends it; the
//! [`analytics`] module later reduces ranges of rows into the statistics a
//! display layer renders.
//!
//! ## Example
//!
//! ```rust,no_run
//! use domoro_core::{Activity, Config, Database, Period, TimerMode, Tracker};
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let mut tracker = Tracker::new();
//! tracker
//!     .start(Activity::Work, TimerMode::Stopwatch, None)
//!     .expect("failed to start session");
//! // ... later ...
//! let mut session = tracker.stop().expect("failed to stop session");
//! db.insert_session(&mut session).expect("failed to save session");
//! tracker.reset().expect("failed to reset tracker");
//!
//! let today = db
//!     .sessions_in_period(Period::Day, chrono::Utc::now())
//!     .expect("query failed");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use period::Period;
pub use tracker::{TimerEvent, Tracker, TrackerSnapshot, TrackerState};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod period;
pub mod tracker;
pub mod types;

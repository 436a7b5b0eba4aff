//! Core domain types for domoro
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Activity** | The category of work a session is tagged with (Work, Study, Class) |
//! | **Mode** | How the session is timed: countdown Timer or open-ended Stopwatch |
//! | **Session** | One completed unit of focused work, persisted as an immutable row |
//! | **Period** | A calendar grouping granularity (day/week/month/year) used for stats |
//!
//! A session's `duration_secs` counts only *active* time; intervals spent
//! paused are excluded by the tracker before the record is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Activity
// ============================================

/// Category of focused work a session is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Work,
    Study,
    Class,
}

impl Activity {
    /// Returns the display name for this activity
    pub fn display_name(&self) -> &'static str {
        match self {
            Activity::Work => "Work",
            Activity::Study => "Study",
            Activity::Class => "Class",
        }
    }

    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Work => "work",
            Activity::Study => "study",
            Activity::Class => "class",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" | "Work" => Ok(Activity::Work),
            "study" | "Study" => Ok(Activity::Study),
            "class" | "Class" => Ok(Activity::Class),
            _ => Err(format!("unknown activity: {}", s)),
        }
    }
}

// ============================================
// Timer Mode
// ============================================

/// How a session is timed.
///
/// A `Timer` counts down toward a configured target duration and finishes
/// automatically when it reaches zero. A `Stopwatch` counts up until the
/// user stops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Timer,
    Stopwatch,
}

impl TimerMode {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Timer => "timer",
            TimerMode::Stopwatch => "stopwatch",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timer" | "Timer" => Ok(TimerMode::Timer),
            "stopwatch" | "Stopwatch" => Ok(TimerMode::Stopwatch),
            _ => Err(format!("unknown timer mode: {}", s)),
        }
    }
}

// ============================================
// Focus Session
// ============================================

/// One unit of focused work.
///
/// Built by the tracker when a session ends and persisted exactly once as
/// an append-only row. `started_at` is immutable after that point; there is
/// no update or delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    /// Row ID, assigned by the store on insert
    pub id: Option<i64>,
    /// Activity category
    pub activity: Activity,
    /// Timing mode the session ran under
    pub mode: TimerMode,
    /// When the session began (UTC)
    pub started_at: DateTime<Utc>,
    /// Seconds of active (non-paused) focus; never negative
    pub duration_secs: i64,
    /// True if a timer ran to zero, or a stopwatch was stopped and kept
    pub completed: bool,
}

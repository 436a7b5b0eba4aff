//! Aggregate statistics over finished sessions.

use chrono::{DateTime, Duration, Timelike, Utc};
use std::collections::HashMap;

use crate::period::Period;
use crate::types::{Activity, FocusSession};

/// Aggregate statistics for one calendar window of sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSummary {
    /// Number of sessions in the window
    pub session_count: i64,
    /// Sessions that ran to completion
    pub completed_count: i64,
    /// Total active focus seconds
    pub total_secs: i64,
    /// Mean active seconds per session; zero for an empty window
    pub average_secs: i64,
    /// Activity totals, sorted by total descending, ties by activity name
    pub breakdown: Vec<(Activity, i64)>,
}

impl PeriodSummary {
    /// Reduce a set of sessions into summary statistics.
    ///
    /// Tolerates an empty slice and is insensitive to input ordering.
    pub fn compute(sessions: &[FocusSession]) -> Self {
        let session_count = sessions.len() as i64;
        let completed_count = sessions.iter().filter(|s| s.completed).count() as i64;
        let total_secs: i64 = sessions.iter().map(|s| s.duration_secs).sum();
        let average_secs = if session_count > 0 {
            total_secs / session_count
        } else {
            0
        };

        let mut totals: HashMap<Activity, i64> = HashMap::new();
        for session in sessions {
            *totals.entry(session.activity).or_insert(0) += session.duration_secs;
        }
        let mut breakdown: Vec<(Activity, i64)> = totals.into_iter().collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));

        Self {
            session_count,
            completed_count,
            total_secs,
            average_secs,
            breakdown,
        }
    }
}

/// Active seconds per start-of-hour bucket (UTC) across a set of sessions.
///
/// A session spanning an hour boundary has its duration split between the
/// buckets it actually covered, so the distribution reflects when the focus
/// happened, not just when sessions began.
pub fn hourly_distribution(sessions: &[FocusSession]) -> [i64; 24] {
    let mut buckets = [0i64; 24];
    for session in sessions {
        let mut cursor = session.started_at;
        let mut remaining = session.duration_secs.max(0);
        while remaining > 0 {
            let into_hour = i64::from(cursor.minute()) * 60 + i64::from(cursor.second());
            let chunk = remaining.min(3600 - into_hour);
            buckets[cursor.hour() as usize] += chunk;
            cursor += Duration::seconds(chunk);
            remaining -= chunk;
        }
    }
    buckets
}

/// Focus vs non-focus seconds for the UTC day containing `now`.
///
/// `focus_secs` is the caller-supplied total for the day (typically
/// `PeriodSummary::total_secs` over a day window); the remainder of the time
/// elapsed since midnight counts as non-focus, clamped at zero.
pub fn focus_share(focus_secs: i64, now: DateTime<Utc>) -> (i64, i64) {
    let (midnight, _) = Period::Day.window(now);
    let elapsed_today = (now - midnight).num_seconds();
    (focus_secs, (elapsed_today - focus_secs).max(0))
}

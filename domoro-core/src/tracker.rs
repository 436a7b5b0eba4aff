//! Timer/stopwatch tracker
//!
//! Holds the in-memory state of the single active focus session as an
//! explicit state machine: `Idle`, `Running`, `Paused`, `Finished`. There is
//! no background timer thread; elapsed and remaining time are pure functions
//! of the recorded interval boundaries and a caller-supplied clock, so
//! correctness does not depend on any refresh cadence.
//!
//! Every mutating operation has a `*_at` form taking an explicit
//! `DateTime<Utc>` plus a convenience wrapper that reads `Utc::now()`. The
//! explicit forms are what tests and state restoration use.
//!
//! Active duration is the sum of run intervals: time between a start/resume
//! and the following pause/stop. Paused intervals never count. For timer
//! mode, elapsed time is capped at the target, so a session that ran past
//! its target (e.g. while no process was polling) records exactly the
//! configured duration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Activity, FocusSession, TimerMode};

/// Observable tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl TrackerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerState::Idle => "idle",
            TrackerState::Running => "running",
            TrackerState::Paused => "paused",
            TrackerState::Finished => "finished",
        }
    }
}

impl std::fmt::Display for TrackerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event emitted by [`Tracker::poll_at`] when a timer completes on its own.
///
/// The caller is responsible for the notification side effect; the tracker
/// only reports that the transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Completed,
}

/// Serialized form of a live (`Running` or `Paused`) tracker.
///
/// Written to the store between CLI invocations so an in-progress session
/// survives process restarts. `run_started_at` is the start of the currently
/// open run interval; `None` means the session is paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub activity: Activity,
    pub mode: TimerMode,
    pub target_secs: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub accumulated_secs: i64,
    pub run_started_at: Option<DateTime<Utc>>,
}

/// In-progress session state.
#[derive(Debug, Clone)]
struct ActiveSession {
    activity: Activity,
    mode: TimerMode,
    /// Target duration; `Some` iff mode is Timer
    target: Option<Duration>,
    started_at: DateTime<Utc>,
    /// Active duration from closed run intervals
    accumulated: Duration,
    /// Start of the open run interval; `None` while paused
    run_started_at: Option<DateTime<Utc>>,
}

impl ActiveSession {
    /// Total active duration at `now`, clamped to the target in timer mode.
    fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        let mut total = self.accumulated;
        if let Some(run_started) = self.run_started_at {
            // Clock skew can make the open interval look negative
            total += (now - run_started).max(Duration::zero());
        }
        match self.target {
            Some(target) => total.min(target),
            None => total,
        }
    }

    /// Build the finished-session record as of `now`.
    fn to_session(&self, now: DateTime<Utc>) -> FocusSession {
        let elapsed = self.elapsed_at(now);
        let completed = match self.target {
            // Timer: completed only if it reached its target
            Some(target) => elapsed >= target,
            // Stopwatch: an explicit stop keeps the session
            None => true,
        };
        FocusSession {
            id: None,
            activity: self.activity,
            mode: self.mode,
            started_at: self.started_at,
            duration_secs: elapsed.num_seconds(),
            completed,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Inner {
    #[default]
    Idle,
    Active(ActiveSession),
    Finished(FocusSession),
}

/// The focus-session tracker.
///
/// Owned by the application context and passed by reference to whatever
/// needs it; a single tracker models the single-active-session rule.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    inner: Inner,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a live tracker from a stored snapshot.
    pub fn restore(snapshot: TrackerSnapshot) -> Result<Self> {
        let target = match (snapshot.mode, snapshot.target_secs) {
            (TimerMode::Timer, Some(secs)) if secs > 0 => Some(Duration::seconds(secs)),
            (TimerMode::Timer, _) => {
                return Err(Error::InvalidConfiguration(
                    "stored timer state has no positive target duration".to_string(),
                ))
            }
            (TimerMode::Stopwatch, _) => None,
        };
        Ok(Self {
            inner: Inner::Active(ActiveSession {
                activity: snapshot.activity,
                mode: snapshot.mode,
                target,
                started_at: snapshot.started_at,
                accumulated: Duration::seconds(snapshot.accumulated_secs.max(0)),
                run_started_at: snapshot.run_started_at,
            }),
        })
    }

    pub fn state(&self) -> TrackerState {
        match &self.inner {
            Inner::Idle => TrackerState::Idle,
            Inner::Active(active) if active.run_started_at.is_some() => TrackerState::Running,
            Inner::Active(_) => TrackerState::Paused,
            Inner::Finished(_) => TrackerState::Finished,
        }
    }

    /// Activity of the live or finished session, if any.
    pub fn activity(&self) -> Option<Activity> {
        match &self.inner {
            Inner::Idle => None,
            Inner::Active(active) => Some(active.activity),
            Inner::Finished(session) => Some(session.activity),
        }
    }

    /// Mode of the live or finished session, if any.
    pub fn mode(&self) -> Option<TimerMode> {
        match &self.inner {
            Inner::Idle => None,
            Inner::Active(active) => Some(active.mode),
            Inner::Finished(session) => Some(session.mode),
        }
    }

    /// Begin a session: `Idle -> Running`.
    ///
    /// Timer mode requires a positive target duration; stopwatch mode must
    /// not pass one. Fails with `InvalidState` if a session is already live.
    pub fn start_at(
        &mut self,
        now: DateTime<Utc>,
        activity: Activity,
        mode: TimerMode,
        target: Option<Duration>,
    ) -> Result<()> {
        if !matches!(self.inner, Inner::Idle) {
            return Err(self.invalid("start"));
        }
        let target = match (mode, target) {
            (TimerMode::Timer, Some(t)) if t > Duration::zero() => Some(t),
            (TimerMode::Timer, Some(_)) => {
                return Err(Error::InvalidConfiguration(
                    "timer target duration must be greater than zero".to_string(),
                ))
            }
            (TimerMode::Timer, None) => {
                return Err(Error::InvalidConfiguration(
                    "timer mode requires a target duration".to_string(),
                ))
            }
            (TimerMode::Stopwatch, None) => None,
            (TimerMode::Stopwatch, Some(_)) => {
                return Err(Error::InvalidConfiguration(
                    "stopwatch mode does not take a target duration".to_string(),
                ))
            }
        };
        self.inner = Inner::Active(ActiveSession {
            activity,
            mode,
            target,
            started_at: now,
            accumulated: Duration::zero(),
            run_started_at: Some(now),
        });
        Ok(())
    }

    /// `Running -> Paused`: close the open run interval.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let err = self.invalid("pause");
        let Inner::Active(active) = &mut self.inner else {
            return Err(err);
        };
        let Some(run_started) = active.run_started_at.take() else {
            return Err(err);
        };
        active.accumulated += (now - run_started).max(Duration::zero());
        Ok(())
    }

    /// `Paused -> Running`: open a fresh run interval at `now`.
    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let err = self.invalid("resume");
        let Inner::Active(active) = &mut self.inner else {
            return Err(err);
        };
        if active.run_started_at.is_some() {
            return Err(err);
        }
        active.run_started_at = Some(now);
        Ok(())
    }

    /// Manual stop: `Running`/`Paused -> Finished`.
    ///
    /// Returns the finished record. It stays available via [`session`] until
    /// [`reset`], so a failed save can be retried with the same record.
    ///
    /// [`session`]: Tracker::session
    /// [`reset`]: Tracker::reset
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Result<FocusSession> {
        let Inner::Active(active) = &self.inner else {
            return Err(self.invalid("stop"));
        };
        let session = active.to_session(now);
        self.inner = Inner::Finished(session.clone());
        Ok(session)
    }

    /// Check for automatic timer completion.
    ///
    /// When a running timer's active duration has reached its target, the
    /// tracker transitions to `Finished` and `Completed` is returned exactly
    /// once; the caller fires the notification side effect.
    pub fn poll_at(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        let Inner::Active(active) = &self.inner else {
            return None;
        };
        if active.run_started_at.is_none() {
            return None;
        }
        let target = active.target?;
        if active.elapsed_at(now) >= target {
            self.inner = Inner::Finished(active.to_session(now));
            return Some(TimerEvent::Completed);
        }
        None
    }

    /// Total active duration as of `now`. Never negative.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        match &self.inner {
            Inner::Idle => Duration::zero(),
            Inner::Active(active) => active.elapsed_at(now),
            Inner::Finished(session) => Duration::seconds(session.duration_secs),
        }
    }

    /// Time left until the timer target, clamped to zero.
    /// `None` for stopwatch sessions and while idle.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        match &self.inner {
            Inner::Idle => None,
            Inner::Active(active) => active
                .target
                .map(|target| (target - active.elapsed_at(now)).max(Duration::zero())),
            Inner::Finished(session) if session.mode == TimerMode::Timer => {
                Some(Duration::zero())
            }
            Inner::Finished(_) => None,
        }
    }

    /// The finished record awaiting hand-off to the store.
    pub fn session(&self) -> Option<&FocusSession> {
        match &self.inner {
            Inner::Finished(session) => Some(session),
            Inner::Idle | Inner::Active(_) => None,
        }
    }

    /// `Finished -> Idle`, once the record has been handed to the store.
    pub fn reset(&mut self) -> Result<()> {
        if !matches!(self.inner, Inner::Finished(_)) {
            return Err(self.invalid("reset"));
        }
        self.inner = Inner::Idle;
        Ok(())
    }

    /// Serialize the live state for persistence between invocations.
    /// `None` while idle or finished.
    pub fn snapshot(&self) -> Option<TrackerSnapshot> {
        let Inner::Active(active) = &self.inner else {
            return None;
        };
        Some(TrackerSnapshot {
            activity: active.activity,
            mode: active.mode,
            target_secs: active.target.map(|t| t.num_seconds()),
            started_at: active.started_at,
            accumulated_secs: active.accumulated.num_seconds(),
            run_started_at: active.run_started_at,
        })
    }

    // ============================================
    // Wall-clock convenience wrappers
    // ============================================

    pub fn start(
        &mut self,
        activity: Activity,
        mode: TimerMode,
        target: Option<Duration>,
    ) -> Result<()> {
        self.start_at(Utc::now(), activity, mode, target)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.pause_at(Utc::now())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.resume_at(Utc::now())
    }

    pub fn stop(&mut self) -> Result<FocusSession> {
        self.stop_at(Utc::now())
    }

    pub fn poll(&mut self) -> Option<TimerEvent> {
        self.poll_at(Utc::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Utc::now())
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining_at(Utc::now())
    }

    fn invalid(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state().as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    fn started_stopwatch() -> Tracker {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Work, TimerMode::Stopwatch, None)
            .unwrap();
        tracker
    }

    #[test]
    fn test_starts_idle() {
        let tracker = Tracker::new();
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(tracker.elapsed_at(t0()), Duration::zero());
        assert!(tracker.remaining_at(t0()).is_none());
        assert!(tracker.activity().is_none());
    }

    #[test]
    fn test_start_requires_positive_timer_target() {
        let mut tracker = Tracker::new();
        let err = tracker
            .start_at(t0(), Activity::Work, TimerMode::Timer, Some(secs(0)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = tracker
            .start_at(t0(), Activity::Work, TimerMode::Timer, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        // Bad parameters must not leave the idle state
        assert_eq!(tracker.state(), TrackerState::Idle);
    }

    #[test]
    fn test_stopwatch_rejects_target() {
        let mut tracker = Tracker::new();
        let err = tracker
            .start_at(t0(), Activity::Work, TimerMode::Stopwatch, Some(secs(60)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_double_start_is_invalid_state() {
        let mut tracker = started_stopwatch();
        let err = tracker
            .start_at(t0(), Activity::Study, TimerMode::Stopwatch, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState { operation: "start", .. }));
    }

    #[test]
    fn test_pause_resume_excludes_paused_time() {
        let mut tracker = started_stopwatch();

        tracker.pause_at(t0() + secs(100)).unwrap();
        assert_eq!(tracker.state(), TrackerState::Paused);

        // Elapsed is frozen while paused, no matter how long
        assert_eq!(tracker.elapsed_at(t0() + secs(100)), secs(100));
        assert_eq!(tracker.elapsed_at(t0() + secs(5000)), secs(100));

        tracker.resume_at(t0() + secs(5000)).unwrap();
        assert_eq!(tracker.state(), TrackerState::Running);
        // Immediately after resume, elapsed equals elapsed before pause
        assert_eq!(tracker.elapsed_at(t0() + secs(5000)), secs(100));

        // And it accumulates again from there
        assert_eq!(tracker.elapsed_at(t0() + secs(5030)), secs(130));
    }

    #[test]
    fn test_pause_outside_running_fails() {
        let mut tracker = Tracker::new();
        assert!(matches!(
            tracker.pause_at(t0()),
            Err(Error::InvalidState { operation: "pause", .. })
        ));

        let mut tracker = started_stopwatch();
        tracker.pause_at(t0() + secs(10)).unwrap();
        assert!(matches!(
            tracker.pause_at(t0() + secs(20)),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_resume_outside_paused_fails() {
        let mut tracker = started_stopwatch();
        assert!(matches!(
            tracker.resume_at(t0() + secs(10)),
            Err(Error::InvalidState { operation: "resume", .. })
        ));
    }

    #[test]
    fn test_stop_records_active_duration_only() {
        let mut tracker = started_stopwatch();
        tracker.pause_at(t0() + secs(600)).unwrap();
        tracker.resume_at(t0() + secs(900)).unwrap();
        let session = tracker.stop_at(t0() + secs(1100)).unwrap();

        // 600s before the pause + 200s after the resume
        assert_eq!(session.duration_secs, 800);
        assert_eq!(session.started_at, t0());
        assert_eq!(session.activity, Activity::Work);
        assert!(session.completed);
        assert_eq!(tracker.state(), TrackerState::Finished);

        // Duration never exceeds wall-clock time since start
        assert!(session.duration_secs <= 1100);
    }

    #[test]
    fn test_stop_from_paused() {
        let mut tracker = started_stopwatch();
        tracker.pause_at(t0() + secs(300)).unwrap();
        let session = tracker.stop_at(t0() + secs(999)).unwrap();
        assert_eq!(session.duration_secs, 300);
    }

    #[test]
    fn test_immediate_stop_is_zero_duration() {
        let mut tracker = started_stopwatch();
        let session = tracker.stop_at(t0()).unwrap();
        assert_eq!(session.duration_secs, 0);
    }

    #[test]
    fn test_clock_skew_clamps_to_zero() {
        let tracker = started_stopwatch();
        // A clock stepping backwards must not produce negative elapsed time
        assert_eq!(tracker.elapsed_at(t0() - secs(30)), Duration::zero());
    }

    #[test]
    fn test_timer_remaining_counts_down() {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Study, TimerMode::Timer, Some(secs(1500)))
            .unwrap();

        assert_eq!(tracker.remaining_at(t0()), Some(secs(1500)));
        assert_eq!(tracker.remaining_at(t0() + secs(600)), Some(secs(900)));
        // Never negative, even past the target
        assert_eq!(tracker.remaining_at(t0() + secs(9999)), Some(Duration::zero()));
    }

    #[test]
    fn test_timer_auto_completes() {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Study, TimerMode::Timer, Some(secs(1500)))
            .unwrap();

        assert!(tracker.poll_at(t0() + secs(1499)).is_none());

        let event = tracker.poll_at(t0() + secs(1500));
        assert_eq!(event, Some(TimerEvent::Completed));
        assert_eq!(tracker.state(), TrackerState::Finished);
        assert_eq!(tracker.remaining_at(t0() + secs(1500)), Some(Duration::zero()));

        // The event fires exactly once
        assert!(tracker.poll_at(t0() + secs(1600)).is_none());

        let session = tracker.session().unwrap();
        assert!(session.completed);
        // Natural completion records the configured target, even if polled late
        assert_eq!(session.duration_secs, 1500);
    }

    #[test]
    fn test_timer_overrun_records_target_duration() {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Class, TimerMode::Timer, Some(secs(300)))
            .unwrap();

        // Polled long after expiry (no process was running)
        tracker.poll_at(t0() + secs(4000)).unwrap();
        assert_eq!(tracker.session().unwrap().duration_secs, 300);
    }

    #[test]
    fn test_timer_stopped_early_is_incomplete() {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Work, TimerMode::Timer, Some(secs(1500)))
            .unwrap();
        let session = tracker.stop_at(t0() + secs(700)).unwrap();

        assert_eq!(session.duration_secs, 700);
        assert!(!session.completed);
    }

    #[test]
    fn test_paused_timer_does_not_auto_complete() {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Work, TimerMode::Timer, Some(secs(60)))
            .unwrap();
        tracker.pause_at(t0() + secs(30)).unwrap();

        assert!(tracker.poll_at(t0() + secs(500)).is_none());
        assert_eq!(tracker.state(), TrackerState::Paused);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut tracker = started_stopwatch();
        tracker.stop_at(t0() + secs(10)).unwrap();
        assert!(tracker.session().is_some());

        tracker.reset().unwrap();
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(tracker.session().is_none());
    }

    #[test]
    fn test_reset_while_running_fails() {
        let mut tracker = started_stopwatch();
        assert!(matches!(
            tracker.reset(),
            Err(Error::InvalidState { operation: "reset", .. })
        ));
    }

    #[test]
    fn test_snapshot_restore_preserves_elapsed() {
        let mut tracker = Tracker::new();
        tracker
            .start_at(t0(), Activity::Study, TimerMode::Timer, Some(secs(1500)))
            .unwrap();
        tracker.pause_at(t0() + secs(200)).unwrap();
        tracker.resume_at(t0() + secs(400)).unwrap();

        let snapshot = tracker.snapshot().unwrap();
        let restored = Tracker::restore(snapshot).unwrap();

        let now = t0() + secs(500);
        assert_eq!(restored.state(), TrackerState::Running);
        assert_eq!(restored.elapsed_at(now), tracker.elapsed_at(now));
        assert_eq!(restored.remaining_at(now), tracker.remaining_at(now));
        assert_eq!(restored.activity(), Some(Activity::Study));
    }

    #[test]
    fn test_snapshot_restore_paused() {
        let mut tracker = started_stopwatch();
        tracker.pause_at(t0() + secs(120)).unwrap();

        let restored = Tracker::restore(tracker.snapshot().unwrap()).unwrap();
        assert_eq!(restored.state(), TrackerState::Paused);
        assert_eq!(restored.elapsed_at(t0() + secs(9000)), secs(120));
    }

    #[test]
    fn test_restore_rejects_corrupt_timer_state() {
        let snapshot = TrackerSnapshot {
            activity: Activity::Work,
            mode: TimerMode::Timer,
            target_secs: None,
            started_at: t0(),
            accumulated_secs: 10,
            run_started_at: Some(t0()),
        };
        assert!(matches!(
            Tracker::restore(snapshot),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_snapshot_none_when_idle_or_finished() {
        let tracker = Tracker::new();
        assert!(tracker.snapshot().is_none());

        let mut tracker = started_stopwatch();
        tracker.stop_at(t0() + secs(5)).unwrap();
        assert!(tracker.snapshot().is_none());
    }
}

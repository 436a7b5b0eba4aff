//! domoro - focus timer CLI
//!
//! One invocation is one user action: start/pause/resume/stop a session,
//! check its status, or print period statistics. In-progress tracker state
//! is persisted to the session database between invocations, so a timer
//! keeps "running" while no process is alive; any later command notices an
//! expired timer, records the session, and fires the notification.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use domoro_core::analytics::{focus_share, PeriodSummary};
use domoro_core::format::{format_duration, format_hms};
use domoro_core::{
    Activity, Config, Database, FocusSession, Period, TimerEvent, TimerMode, Tracker,
};

#[derive(Parser)]
#[command(name = "domoro")]
#[command(about = "Focus timer with session tracking and period statistics")]
#[command(version)]
struct Cli {
    /// Use a specific database file instead of the default XDG location
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a focus session
    Start {
        /// Activity to tag the session with: work, study or class
        #[arg(short, long)]
        activity: Activity,

        /// Run as an open-ended stopwatch instead of a countdown timer
        #[arg(long)]
        stopwatch: bool,

        /// Countdown target in minutes (timer mode; defaults from config)
        #[arg(short, long, conflicts_with = "stopwatch")]
        minutes: Option<i64>,
    },

    /// Pause the running session
    Pause,

    /// Resume a paused session
    Resume,

    /// Stop the session and record it
    Stop,

    /// Show the state of the current session
    Status,

    /// Show aggregate statistics for a calendar period
    Stats {
        /// Grouping window: day, week, month or year
        #[arg(short, long, default_value = "day")]
        period: Period,
    },

    /// Write a timestamped backup of the session database
    Backup {
        /// Directory to write the backup into
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        domoro_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = cli.database.clone().unwrap_or_else(Config::database_path);
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    match cli.command {
        Command::Start {
            activity,
            stopwatch,
            minutes,
        } => cmd_start(&db, &config, activity, stopwatch, minutes),
        Command::Pause => cmd_pause(&db),
        Command::Resume => cmd_resume(&db),
        Command::Stop => cmd_stop(&db),
        Command::Status => cmd_status(&db),
        Command::Stats { period } => cmd_stats(&db, period),
        Command::Backup { dir } => cmd_backup(&db, dir),
    }
}

fn cmd_start(
    db: &Database,
    config: &Config,
    activity: Activity,
    stopwatch: bool,
    minutes: Option<i64>,
) -> Result<()> {
    if db.load_tracker_state()?.is_some() {
        bail!("a session is already in progress; stop it first with `domoro stop`");
    }

    let mut tracker = Tracker::new();
    if stopwatch {
        tracker.start(activity, TimerMode::Stopwatch, None)?;
        println!("Started {} stopwatch.", activity.display_name());
    } else {
        let minutes = minutes.unwrap_or(config.timer.default_minutes);
        tracker.start(activity, TimerMode::Timer, Some(Duration::minutes(minutes)))?;
        println!(
            "Started {} timer for {} minutes.",
            activity.display_name(),
            minutes
        );
    }

    let snapshot = tracker
        .snapshot()
        .context("tracker should be live after start")?;
    db.save_tracker_state(&snapshot)?;
    tracing::info!(%activity, stopwatch, "Session started");
    Ok(())
}

fn cmd_pause(db: &Database) -> Result<()> {
    let Some(mut tracker) = load_live_tracker(db)? else {
        bail!("no session in progress");
    };
    if check_completion(db, &mut tracker)? {
        return Ok(());
    }

    tracker.pause()?;
    save_snapshot(db, &tracker)?;
    println!("Paused at {}.", format_duration(tracker.elapsed()));
    Ok(())
}

fn cmd_resume(db: &Database) -> Result<()> {
    let Some(mut tracker) = load_live_tracker(db)? else {
        bail!("no session in progress");
    };

    tracker.resume()?;
    save_snapshot(db, &tracker)?;
    println!("Resumed at {}.", format_duration(tracker.elapsed()));
    Ok(())
}

fn cmd_stop(db: &Database) -> Result<()> {
    let Some(mut tracker) = load_live_tracker(db)? else {
        bail!("no session in progress");
    };
    if check_completion(db, &mut tracker)? {
        return Ok(());
    }

    tracker.stop()?;
    let session = finalize(db, &mut tracker)?;
    println!(
        "Stopped. Recorded {} of {} ({}).",
        format_hms(session.duration_secs),
        session.activity.display_name(),
        if session.completed {
            "completed"
        } else {
            "stopped early"
        }
    );
    Ok(())
}

fn cmd_status(db: &Database) -> Result<()> {
    let Some(mut tracker) = load_live_tracker(db)? else {
        println!("No session in progress.");
        return Ok(());
    };
    if check_completion(db, &mut tracker)? {
        return Ok(());
    }

    let activity = tracker
        .activity()
        .context("live tracker must have an activity")?;
    let mode = tracker.mode().context("live tracker must have a mode")?;

    println!("{} {} is {}.", activity.display_name(), mode, tracker.state());
    println!("  elapsed   {}", format_duration(tracker.elapsed()));
    if let Some(remaining) = tracker.remaining() {
        println!("  remaining {}", format_duration(remaining));
    }
    Ok(())
}

fn cmd_stats(db: &Database, period: Period) -> Result<()> {
    let now = Utc::now();
    let sessions = db.sessions_in_period(period, now)?;
    let summary = PeriodSummary::compute(&sessions);

    println!("Stats for {}", period.label(now));
    println!(
        "  sessions   {} ({} completed)",
        summary.session_count, summary.completed_count
    );
    println!("  total      {}", format_hms(summary.total_secs));
    println!("  average    {}", format_hms(summary.average_secs));

    if !summary.breakdown.is_empty() {
        println!("  by activity:");
        for (activity, secs) in &summary.breakdown {
            println!("    {:<8} {}", activity.display_name(), format_hms(*secs));
        }
    }

    if period == Period::Day {
        let (focus, non_focus) = focus_share(summary.total_secs, now);
        println!(
            "  focus vs idle today: {} / {}",
            format_hms(focus),
            format_hms(non_focus)
        );
    }
    Ok(())
}

fn cmd_backup(db: &Database, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| Config::data_dir().join("backups"));
    let path = db.backup(&dir).context("failed to write backup")?;
    println!("Backup written to {}", path.display());
    Ok(())
}

/// Restore the persisted tracker, if a session is in progress.
fn load_live_tracker(db: &Database) -> Result<Option<Tracker>> {
    match db
        .load_tracker_state()
        .context("failed to load tracker state")?
    {
        Some(snapshot) => Ok(Some(
            Tracker::restore(snapshot).context("failed to restore tracker state")?,
        )),
        None => Ok(None),
    }
}

fn save_snapshot(db: &Database, tracker: &Tracker) -> Result<()> {
    let snapshot = tracker.snapshot().context("tracker should still be live")?;
    db.save_tracker_state(&snapshot)?;
    Ok(())
}

/// If a running timer hit its target (possibly while no process was alive),
/// record the session and fire the completion notification.
fn check_completion(db: &Database, tracker: &mut Tracker) -> Result<bool> {
    if tracker.poll() != Some(TimerEvent::Completed) {
        return Ok(false);
    }
    let session = finalize(db, tracker)?;
    notify_completion(&session);
    Ok(true)
}

/// Hand a finished session to the store, then return the tracker to idle.
///
/// The insert happens before the saved state is cleared, so a failed save
/// leaves everything in place for the next invocation to retry.
fn finalize(db: &Database, tracker: &mut Tracker) -> Result<FocusSession> {
    let mut session = tracker
        .session()
        .context("no finished session to record")?
        .clone();
    db.insert_session(&mut session)
        .context("failed to save session; run the command again to retry")?;
    db.clear_tracker_state()?;
    tracker.reset()?;
    Ok(session)
}

fn notify_completion(session: &FocusSession) {
    // BEL is the closest thing a plain terminal has to a notification sound
    println!(
        "\u{0007}Timer complete! Recorded {} of {}.",
        format_hms(session.duration_secs),
        session.activity.display_name()
    );
    tracing::info!(
        activity = %session.activity,
        duration_secs = session.duration_secs,
        "Timer completed"
    );
}

//! Analytics for the focus dashboard
//!
//! Pure reductions over slices of [`FocusSession`] rows read back from the
//! store. Everything here is deterministic for a given set of sessions,
//! regardless of input order, and total on empty input.
//!
//! [`FocusSession`]: crate::types::FocusSession

pub mod summary;

pub use summary::{focus_share, hourly_distribution, PeriodSummary};

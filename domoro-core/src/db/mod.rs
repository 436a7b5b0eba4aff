//! Database layer for domoro
//!
//! SQLite storage with:
//! - Schema migrations via PRAGMA user_version
//! - Append-only session log and range queries
//! - Live tracker state persistence between invocations

pub mod repo;
pub mod schema;

pub use repo::Database;

//! Repository layer — entity-scoped database operations.
//!
//! Every function borrows an open connection; callers own the connection
//! lifetime. Inserts that hit a uniqueness constraint return `Ok(false)`.

mod doctor;
mod patient;
mod prescription;
mod seed;
mod session;
mod stats;

pub use doctor::*;
pub use patient::*;
pub use prescription::*;
pub use seed::*;
pub use session::*;
pub use stats::*;

/// UTC time in SQLite's `datetime('now')` text format.
pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn now_timestamp() -> String {
    format_timestamp(chrono::Utc::now())
}

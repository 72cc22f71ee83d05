//! API endpoint handlers.
//!
//! Each module covers one area of the clinic web app. Handlers call the
//! repository layer directly and run model work on the blocking pool.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod patients;
pub mod prescriptions;

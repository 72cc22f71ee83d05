//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: session cookie lookup
//! 2. Audit logger: logs after auth, has the caller

pub mod audit;
pub mod auth;

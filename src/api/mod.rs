//! Web API for the clinic app.
//!
//! Routes are nested under `/api/` and, apart from login, session probes
//! and demo credentials, require a session cookie. The router is composable:
//! `api_router()` returns a `Router` that `server::serve` mounts on a
//! TCP listener.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;

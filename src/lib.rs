pub mod api;
pub mod config;
pub mod core_state;
pub mod crypto;
pub mod db;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core_state::{CoreError, CoreState};

/// Start the web service and block until it shuts down.
///
/// State (and the blocking HTTP clients inside it) is built before the
/// tokio runtime starts and dropped after it stops.
pub fn run() -> Result<(), CoreError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    let addr = config.bind_addr();
    let state = Arc::new(CoreState::build(config)?);

    let purged = db::purge_expired_sessions(&state.open_db()?, &db::now_timestamp())?;
    if purged > 0 {
        tracing::info!(purged, "Expired sessions removed");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(api::server::serve(state.clone(), &addr))?;
    drop(runtime);

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

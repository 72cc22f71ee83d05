//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub llm_configured: bool,
    pub database_connected: bool,
    pub version: &'static str,
}

/// `GET /health`
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let core = ctx.core.clone();
    let database_connected = tokio::task::spawn_blocking(move || core.database_connected())
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        llm_configured: ctx.core.llm_configured(),
        database_connected,
        version: crate::config::APP_VERSION,
    })
}

//! Web API router.
//!
//! Routes are nested under `/api/`, with `/health` at the root.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Auth validator → 2. Audit logger

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the web API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    let upload_limit = ctx.core.config.max_upload_bytes;

    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/patient/search", get(endpoints::patients::search))
        .route("/patient/add", post(endpoints::patients::add))
        .route(
            "/patient/:id",
            get(endpoints::patients::detail).put(endpoints::patients::update),
        )
        .route(
            "/upload",
            post(endpoints::prescriptions::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/history/:id", get(endpoints::prescriptions::history))
        .route("/prescriptions/:id", get(endpoints::prescriptions::list))
        .route("/dashboard/stats", get(endpoints::dashboard::stats))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Login and session probes resolve the cookie themselves.
    let public = Router::new()
        .route("/login", post(endpoints::auth::login))
        .route("/logout", post(endpoints::auth::logout))
        .route("/session", get(endpoints::auth::session))
        .route("/demo-accounts", get(endpoints::dashboard::demo_accounts))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    let health = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected.merge(public))
        .merge(health)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

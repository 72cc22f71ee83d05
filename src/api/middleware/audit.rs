//! Audit logging middleware.
//!
//! Logs every API request with method, path, caller and response status.
//! Runs innermost so the auth middleware has already injected the caller.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::models::SessionUser;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let user = req
        .extensions()
        .get::<SessionUser>()
        .map(|u| format!("{}:{}", u.user_type, u.user_id))
        .unwrap_or_else(|| "anonymous".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, %user, status, "API request failed");
    } else {
        tracing::info!(%method, %path, %user, status, "API request");
    }

    response
}

//! Session cookie authentication middleware.
//!
//! Resolves the `session_token` cookie against the sessions table and
//! injects the `SessionUser` into request extensions for downstream
//! handlers.

use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{session_token_from_headers, ApiContext};
use crate::crypto::hash_token;
use crate::db;
use crate::models::SessionUser;

/// Require a live session. Responds 401 when the cookie is missing,
/// unknown or expired.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let user = resolve_session(&ctx, req.headers())?.ok_or(ApiError::Unauthorized)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Look up the caller's session from the request cookie, if any.
pub fn resolve_session(
    ctx: &ApiContext,
    headers: &HeaderMap,
) -> Result<Option<SessionUser>, ApiError> {
    let Some(token) = session_token_from_headers(headers) else {
        return Ok(None);
    };

    let conn = ctx.core.open_db()?;
    let user = db::get_active_session(&conn, &hash_token(&token), &db::now_timestamp())?;
    Ok(user)
}

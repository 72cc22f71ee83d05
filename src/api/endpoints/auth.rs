//! Login, logout and session endpoints.
//!
//! `POST /api/login`: doctors sign in with email and password, patients
//! with their bare patient id. Both get an `HttpOnly` session cookie.
//! `POST /api/logout`: removes the session row and clears the cookie.
//! `GET /api/session`: reports who the cookie belongs to, if anyone.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::middleware::auth::resolve_session;
use crate::api::types::{
    cleared_session_cookie, session_cookie, session_token_from_headers, ApiContext,
};
use crate::core_state::CoreState;
use crate::crypto::{generate_token, hash_token};
use crate::db;
use crate::models::UserType;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_type: String,
    /// Email for doctors, patient id for patients.
    pub identifier: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_type: UserType,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// `POST /api/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let core = ctx.core.clone();
    // Password verification runs PBKDF2; keep it off the async workers.
    let account = tokio::task::spawn_blocking(move || authenticate(&core, &request))
        .await??
        .ok_or(ApiError::InvalidCredentials)?;

    let token = generate_token();
    let lifetime = chrono::Duration::hours(ctx.core.config.session_lifetime_hours);
    let now = chrono::Utc::now();

    let conn = ctx.core.open_db()?;
    db::insert_session(
        &conn,
        &hash_token(&token),
        &account.user_id,
        account.user_type,
        &account.name,
        &db::format_timestamp(now),
        &db::format_timestamp(now + lifetime),
    )?;

    tracing::info!(
        user_type = account.user_type.as_str(),
        user_id = %account.user_id,
        "User logged in"
    );

    let cookie = session_cookie(&token, lifetime.num_seconds());
    Ok(([(header::SET_COOKIE, cookie)], Json(account)))
}

/// `POST /api/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token_from_headers(&headers) {
        let conn = ctx.core.open_db()?;
        db::delete_session(&conn, &hash_token(&token))?;
    }

    Ok((
        [(header::SET_COOKIE, cleared_session_cookie())],
        Json(LogoutResponse { success: true }),
    ))
}

/// `GET /api/session`
pub async fn session(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let response = match resolve_session(&ctx, &headers)? {
        Some(user) => SessionResponse {
            logged_in: true,
            user_type: Some(user.user_type),
            user_id: Some(user.user_id),
            user_name: Some(user.user_name),
        },
        None => SessionResponse {
            logged_in: false,
            user_type: None,
            user_id: None,
            user_name: None,
        },
    };
    Ok(Json(response))
}

/// Resolve login credentials to an account. `None` means rejected.
fn authenticate(
    core: &Arc<CoreState>,
    request: &LoginRequest,
) -> Result<Option<LoginResponse>, ApiError> {
    let Ok(user_type) = request.user_type.parse::<UserType>() else {
        return Ok(None);
    };
    let identifier = request.identifier.trim();
    if identifier.is_empty() {
        return Ok(None);
    }

    let conn = core.open_db()?;
    let account = match user_type {
        UserType::Doctor => {
            let password = request.password.as_deref().unwrap_or_default();
            db::verify_doctor(&conn, identifier, password)?.map(|doctor| LoginResponse {
                success: true,
                user_type,
                user_id: doctor.doctor_id,
                name: doctor.name,
                specialization: doctor.specialization,
            })
        }
        UserType::Patient => db::get_patient(&conn, identifier)?.map(|patient| LoginResponse {
            success: true,
            user_type,
            user_id: patient.patient_id,
            name: patient.name,
            specialization: None,
        }),
    };
    Ok(account)
}

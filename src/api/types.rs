//! Shared types for the web API layer.

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::models::{SessionUser, UserType};

/// Name of the cookie carrying the raw session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Caller checks
// ═══════════════════════════════════════════════════════════

/// Reject callers that are not logged in as a doctor.
pub fn require_doctor(user: &SessionUser) -> Result<(), ApiError> {
    match user.user_type {
        UserType::Doctor => Ok(()),
        UserType::Patient => Err(ApiError::Forbidden),
    }
}

/// Patients may only read their own records; doctors may read any.
pub fn ensure_can_read(user: &SessionUser, patient_id: &str) -> Result<(), ApiError> {
    match user.user_type {
        UserType::Doctor => Ok(()),
        UserType::Patient if user.user_id == patient_id => Ok(()),
        UserType::Patient => Err(ApiError::Forbidden),
    }
}

// ═══════════════════════════════════════════════════════════
// Session cookie
// ═══════════════════════════════════════════════════════════

/// Pull the session token out of the `Cookie` request header(s).
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value issuing a session token.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value removing the session token.
pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(user_type: UserType, id: &str) -> SessionUser {
        SessionUser {
            user_id: id.into(),
            user_type,
            user_name: "Someone".into(),
            expires_at: "2099-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn token_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=abc123; lang=en"),
        );
        assert_eq!(session_token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        let mut headers = HeaderMap::new();
        assert!(session_token_from_headers(&headers).is_none());
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token="));
        assert!(session_token_from_headers(&headers).is_none());
    }

    #[test]
    fn cookie_is_http_only() {
        let cookie = session_cookie("tok", 3600);
        assert!(cookie.starts_with("session_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cleared_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn patients_read_only_their_own_records() {
        let patient = user(UserType::Patient, "P001");
        assert!(ensure_can_read(&patient, "P001").is_ok());
        assert!(matches!(ensure_can_read(&patient, "P002"), Err(ApiError::Forbidden)));
        assert!(ensure_can_read(&user(UserType::Doctor, "DOC001"), "P002").is_ok());
    }

    #[test]
    fn only_doctors_pass_doctor_gate() {
        assert!(require_doctor(&user(UserType::Doctor, "DOC001")).is_ok());
        assert!(require_doctor(&user(UserType::Patient, "P001")).is_err());
    }
}

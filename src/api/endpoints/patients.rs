//! Patient endpoints.
//!
//! `GET /api/patient/search?q=`: doctors only
//! `POST /api/patient/add`: doctors only
//! `GET /api/patient/:id`: doctors, or the patient themself
//! `PUT /api/patient/:id`: doctors only

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ensure_can_read, require_doctor, ApiContext};
use crate::db;
use crate::models::{NewPatient, Patient, PatientUpdate, SessionUser};

/// Queries shorter than this return no matches.
const MIN_SEARCH_LENGTH: usize = 2;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `GET /api/patient/search?q=`
pub async fn search(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    require_doctor(&user)?;

    let q = query.q.trim();
    if q.chars().count() < MIN_SEARCH_LENGTH {
        return Ok(Json(Vec::new()));
    }

    let conn = ctx.core.open_db()?;
    Ok(Json(db::search_patients(&conn, q)?))
}

/// `POST /api/patient/add`
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    Json(mut patient): Json<NewPatient>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_doctor(&user)?;

    patient.patient_id = patient.patient_id.trim().to_string();
    patient.name = patient.name.trim().to_string();
    if patient.patient_id.is_empty() || patient.name.is_empty() {
        return Err(ApiError::BadRequest("Patient ID and name are required".into()));
    }

    let conn = ctx.core.open_db()?;
    if !db::insert_patient(&conn, &patient)? {
        return Err(ApiError::BadRequest("Patient ID already exists".into()));
    }

    tracing::info!(patient_id = %patient.patient_id, doctor_id = %user.user_id, "Patient added");
    Ok(Json(SuccessResponse { success: true }))
}

/// `GET /api/patient/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    ensure_can_read(&user, &patient_id)?;

    let conn = ctx.core.open_db()?;
    db::get_patient(&conn, &patient_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))
}

/// `PUT /api/patient/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    Path(patient_id): Path<String>,
    Json(update): Json<PatientUpdate>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_doctor(&user)?;

    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("Patient name cannot be empty".into()));
    }

    let conn = ctx.core.open_db()?;
    if !db::update_patient(&conn, &patient_id, &update)? {
        return Err(ApiError::NotFound("Patient not found or nothing to update".into()));
    }

    tracing::info!(patient_id = %patient_id, doctor_id = %user.user_id, "Patient updated");
    Ok(Json(SuccessResponse { success: true }))
}

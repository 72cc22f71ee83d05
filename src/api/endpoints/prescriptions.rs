//! Prescription endpoints.
//!
//! `POST /api/upload`: doctor uploads a PDF or image for a patient. The file
//! is stored, extracted, and folded into both role summaries before the
//! prescription row is written.
//! `GET /api/history/:id`: the caller's role summary plus the record list.
//! `GET /api/prescriptions/:id`: record list, newest first.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::api::error::ApiError;
use crate::api::types::{ensure_can_read, require_doctor, ApiContext};
use crate::db;
use crate::models::{Patient, PrescriptionEntry, PrescriptionRecord, Role, SessionUser};
use crate::pipeline::extraction::{ExtractedPrescription, FileKind};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub prescription_id: String,
    pub doctor_summary: String,
    pub patient_summary: String,
    pub extracted_data: ExtractedPrescription,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub summary: String,
    pub role: Role,
    pub patient: Option<Patient>,
    pub prescriptions: Vec<PrescriptionEntry>,
    pub total_prescriptions: i64,
}

/// Stored-name collisions tolerated before an upload is refused.
const MAX_NAME_ATTEMPTS: usize = 100;

/// File part of an upload form.
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// `POST /api/upload`
///
/// File type and patient are checked before anything is written or any
/// model is called.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    require_doctor(&user)?;

    let mut file: Option<UploadedFile> = None;
    let mut patient_id: Option<String> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "prescription" => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile {
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            "patient_id" => {
                let value = field.text().await.map_err(multipart_error)?;
                patient_id = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;
    let patient_id =
        patient_id.ok_or_else(|| ApiError::BadRequest("Patient ID is required".into()))?;
    if file.name.trim().is_empty() {
        return Err(ApiError::BadRequest("No file selected".into()));
    }

    let (kind, file_type) =
        FileKind::from_filename(&file.name).map_err(|_| ApiError::InvalidFileType)?;

    {
        let conn = ctx.core.open_db()?;
        if !db::patient_exists(&conn, &patient_id)? {
            return Err(ApiError::NotFound(
                "Patient not found. Please add patient first.".into(),
            ));
        }
    }

    let now = chrono::Utc::now();
    let stem = format!(
        "{}_{}",
        secure_filename(&patient_id),
        now.format("%Y%m%d_%H%M%S_%3f")
    );
    let path = save_upload(&ctx.core.config.upload_dir, &stem, &file)
        .await
        .map_err(|e| ApiError::Internal(format!("saving upload: {e}")))?;

    tracing::info!(
        patient_id = %patient_id,
        file_type = %file_type,
        size = file.bytes.len(),
        "Prescription upload received"
    );

    let core = ctx.core.clone();
    let job_path = path.clone();
    let job_patient = patient_id.clone();
    let result = tokio::task::spawn_blocking(move || {
        core.processor()
            .process_prescription(&job_path, &job_patient, kind)
    })
    .await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            remove_upload(&path).await;
            return Err(ApiError::ProcessingFailed(e.to_string()));
        }
        Err(e) => {
            remove_upload(&path).await;
            return Err(ApiError::ProcessingFailed(e.to_string()));
        }
    };

    let record = PrescriptionRecord {
        prescription_id: prescription_id(now, &patient_id),
        patient_id: patient_id.clone(),
        doctor_id: Some(user.user_id.clone()),
        file_path: Some(path.display().to_string()),
        file_type: Some(file_type),
        diagnosis: output.extracted_data.diagnosis_text(),
        medications: output.extracted_data.medications_text(),
        notes: output.extracted_data.notes_text(),
    };
    let conn = ctx.core.open_db()?;
    if !db::insert_prescription(&conn, &record)? {
        return Err(ApiError::ProcessingFailed(format!(
            "prescription {} already recorded",
            record.prescription_id
        )));
    }

    tracing::info!(
        prescription_id = %record.prescription_id,
        patient_id = %patient_id,
        doctor_id = %user.user_id,
        "Prescription processed"
    );

    Ok(Json(UploadResponse {
        success: true,
        prescription_id: record.prescription_id,
        doctor_summary: output.doctor_view,
        patient_summary: output.patient_view,
        extracted_data: output.extracted_data,
    }))
}

/// `GET /api/history/:id`
///
/// Returns the summary written for the caller's role.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    Path(patient_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    ensure_can_read(&user, &patient_id)?;
    let role = Role::from(user.user_type);

    let core = ctx.core.clone();
    let lookup_id = patient_id.clone();
    let summary = tokio::task::spawn_blocking(move || {
        core.processor()
            .summaries()
            .get_existing_summary(&lookup_id, role)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("No history found for this patient".into()))?;

    let conn = ctx.core.open_db()?;
    let patient = db::get_patient(&conn, &patient_id)?;
    let prescriptions = db::get_patient_prescriptions(&conn, &patient_id)?;
    let total_prescriptions = db::count_patient_prescriptions(&conn, &patient_id)?;

    Ok(Json(HistoryResponse {
        summary,
        role,
        patient,
        prescriptions,
        total_prescriptions,
    }))
}

/// `GET /api/prescriptions/:id`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<PrescriptionEntry>>, ApiError> {
    ensure_can_read(&user, &patient_id)?;

    let conn = ctx.core.open_db()?;
    Ok(Json(db::get_patient_prescriptions(&conn, &patient_id)?))
}

/// `RX_<utc timestamp with millis>_<patient id>`.
fn prescription_id(at: chrono::DateTime<chrono::Utc>, patient_id: &str) -> String {
    format!("RX_{}_{patient_id}", at.format("%Y%m%d_%H%M%S_%3f"))
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; whitespace becomes `_`;
/// leading dots are dropped.
fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write the upload as `{stem}_{safe name}`, never replacing an existing
/// file. A taken name gets a numeric suffix before the extension.
async fn save_upload(dir: &FsPath, stem: &str, file: &UploadedFile) -> std::io::Result<PathBuf> {
    let safe = secure_filename(&file.name);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(stored_name(stem, &safe, attempt));
        let mut out = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&file.bytes).await?;
        out.flush().await?;
        return Ok(path);
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free upload name for {stem}_{safe}"),
    ))
}

fn stored_name(stem: &str, safe_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return format!("{stem}_{safe_name}");
    }
    match safe_name.rsplit_once('.') {
        Some((base, ext)) => format!("{stem}_{base}_{attempt}.{ext}"),
        None => format!("{stem}_{safe_name}_{attempt}"),
    }
}

async fn remove_upload(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), "Failed to remove upload: {e}");
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

//! Dashboard and demo account endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{require_doctor, ApiContext};
use crate::db;
use crate::models::{DashboardStats, SessionUser};

#[derive(Debug, Serialize)]
pub struct DemoDoctor {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DemoPatient {
    pub patient_id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DemoAccounts {
    pub doctor: DemoDoctor,
    pub patient: DemoPatient,
}

/// `GET /api/dashboard/stats`: counts scoped to the calling doctor.
pub async fn stats(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<DashboardStats>, ApiError> {
    require_doctor(&user)?;

    let conn = ctx.core.open_db()?;
    Ok(Json(db::dashboard_stats(&conn, Some(&user.user_id))?))
}

/// `GET /api/demo-accounts`
pub async fn demo_accounts() -> Json<DemoAccounts> {
    Json(DemoAccounts {
        doctor: DemoDoctor {
            email: db::DEMO_DOCTOR_EMAIL,
            password: db::DEMO_DOCTOR_PASSWORD,
            name: db::DEMO_DOCTOR_NAME,
        },
        patient: DemoPatient {
            patient_id: db::DEMO_PATIENT_ID,
            name: db::DEMO_PATIENT_NAME,
        },
    })
}

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::DashboardStats;

/// Dashboard counters. `total_patients` and `new_patients_week` are global;
/// `total_prescriptions` is limited to `doctor_id` when one is given.
pub fn dashboard_stats(
    conn: &Connection,
    doctor_id: Option<&str>,
) -> Result<DashboardStats, DatabaseError> {
    let total_patients: i64 =
        conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;

    let total_prescriptions: i64 = match doctor_id {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM prescriptions WHERE doctor_id = ?1",
            params![id],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM prescriptions", [], |row| row.get(0))?,
    };

    let new_patients_week: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE created_at >= datetime('now', '-7 days')",
        [],
        |row| row.get(0),
    )?;

    Ok(DashboardStats {
        total_patients,
        total_prescriptions,
        new_patients_week,
    })
}

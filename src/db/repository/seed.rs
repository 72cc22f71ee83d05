use rusqlite::{params, Connection};

use crate::crypto::hash_password;
use crate::db::DatabaseError;

use super::now_timestamp;

pub const DEMO_DOCTOR_ID: &str = "DOC001";
pub const DEMO_DOCTOR_EMAIL: &str = "doctor@demo.com";
pub const DEMO_DOCTOR_PASSWORD: &str = "doctor123";
pub const DEMO_DOCTOR_NAME: &str = "Dr. Rajesh Kumar";
pub const DEMO_PATIENT_ID: &str = "P001";
pub const DEMO_PATIENT_NAME: &str = "Sachin Sansare";

/// Insert the demo doctor and patient if they are missing.
///
/// Runs on every startup; existing rows are left alone, so the demo
/// doctor's salt is only generated once.
pub fn seed_demo_accounts(conn: &Connection) -> Result<(), DatabaseError> {
    let now = now_timestamp();

    let doctor_present: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM doctors WHERE doctor_id = ?1)",
        params![DEMO_DOCTOR_ID],
        |row| row.get(0),
    )?;
    if !doctor_present {
        let credential = hash_password(DEMO_DOCTOR_PASSWORD);
        conn.execute(
            "INSERT OR IGNORE INTO doctors (doctor_id, name, email, password_hash, password_salt,
             specialization, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                DEMO_DOCTOR_ID,
                DEMO_DOCTOR_NAME,
                DEMO_DOCTOR_EMAIL,
                credential.hash,
                credential.salt,
                "General Medicine",
                "+91 9876543210",
                now,
            ],
        )?;
    }

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO patients (patient_id, name, age, gender, phone, email, address,
         blood_group, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            DEMO_PATIENT_ID,
            DEMO_PATIENT_NAME,
            28,
            "Male",
            "+91 9876543211",
            "sachin@demo.com",
            "Chennai, Tamil Nadu",
            "O+",
            now,
        ],
    )?;

    if !doctor_present || inserted > 0 {
        tracing::info!("Demo accounts seeded");
    }
    Ok(())
}

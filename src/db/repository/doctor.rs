use rusqlite::{params, Connection, OptionalExtension};

use crate::crypto::{hash_password, verify_password, PasswordHash};
use crate::db::{is_unique_violation, DatabaseError};
use crate::models::*;

use super::now_timestamp;

const DOCTOR_COLUMNS: &str =
    "doctor_id, name, email, specialization, phone, created_at, password_hash, password_salt";

/// Insert a doctor. Returns `Ok(false)` if the id or email is already taken.
pub fn insert_doctor(conn: &Connection, doctor: &NewDoctor) -> Result<bool, DatabaseError> {
    let credential = hash_password(&doctor.password);
    let result = conn.execute(
        "INSERT INTO doctors (doctor_id, name, email, password_hash, password_salt,
         specialization, phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            doctor.doctor_id,
            doctor.name,
            doctor.email,
            credential.hash,
            credential.salt,
            doctor.specialization,
            doctor.phone,
            now_timestamp(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => {
            tracing::info!(doctor_id = %doctor.doctor_id, "Doctor insert rejected: duplicate");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_doctor(conn: &Connection, doctor_id: &str) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE doctor_id = ?1");
    let row = conn
        .query_row(&sql, params![doctor_id], doctor_with_credential)
        .optional()?;
    Ok(row.map(|(doctor, _)| doctor))
}

/// Look up a doctor by email and check the password.
///
/// Unknown email and wrong password both return `Ok(None)`.
pub fn verify_doctor(
    conn: &Connection,
    email: &str,
    password: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1");
    let Some((doctor, credential)) = conn
        .query_row(&sql, params![email], doctor_with_credential)
        .optional()?
    else {
        return Ok(None);
    };

    match verify_password(password, &credential) {
        Ok(true) => Ok(Some(doctor)),
        Ok(false) => Ok(None),
        Err(e) => {
            tracing::warn!(doctor_id = %doctor.doctor_id, error = %e, "Stored credential unreadable");
            Ok(None)
        }
    }
}

fn doctor_with_credential(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Doctor, PasswordHash)> {
    Ok((
        Doctor {
            doctor_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            specialization: row.get(3)?,
            phone: row.get(4)?,
            created_at: row.get(5)?,
        },
        PasswordHash {
            hash: row.get(6)?,
            salt: row.get(7)?,
        },
    ))
}

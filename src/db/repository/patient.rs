use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::*;

use super::now_timestamp;

const PATIENT_COLUMNS: &str = "patient_id, name, age, gender, phone, email, address,
     blood_group, emergency_contact, created_at, updated_at";

/// Insert a patient. Returns `Ok(false)` if the id already exists.
pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<bool, DatabaseError> {
    let now = now_timestamp();
    let result = conn.execute(
        "INSERT INTO patients (patient_id, name, age, gender, phone, email, address,
         blood_group, emergency_contact, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            patient.patient_id,
            patient.name,
            patient.age,
            patient.gender,
            patient.phone,
            patient.email,
            patient.address,
            patient.blood_group,
            patient.emergency_contact,
            now,
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn get_patient(conn: &Connection, patient_id: &str) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?1");
    Ok(conn.query_row(&sql, params![patient_id], row_to_patient).optional()?)
}

pub fn patient_exists(conn: &Connection, patient_id: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Apply the fields set in `update`. Returns `Ok(false)` when nothing was
/// set or no patient has that id.
pub fn update_patient(
    conn: &Connection,
    patient_id: &str,
    update: &PatientUpdate,
) -> Result<bool, DatabaseError> {
    if update.is_empty() {
        return Ok(false);
    }

    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    let text_fields = [
        ("name = ?", &update.name),
        ("gender = ?", &update.gender),
        ("phone = ?", &update.phone),
        ("email = ?", &update.email),
        ("address = ?", &update.address),
        ("blood_group = ?", &update.blood_group),
        ("emergency_contact = ?", &update.emergency_contact),
    ];
    for (assignment, field) in text_fields {
        if let Some(v) = field {
            assignments.push(assignment);
            values.push(Value::Text(v.clone()));
        }
    }
    if let Some(age) = update.age {
        assignments.push("age = ?");
        values.push(Value::Integer(age));
    }

    assignments.push("updated_at = ?");
    values.push(Value::Text(now_timestamp()));
    values.push(Value::Text(patient_id.to_string()));

    let sql = format!(
        "UPDATE patients SET {} WHERE patient_id = ?",
        assignments.join(", ")
    );
    let changed = conn.execute(&sql, params_from_iter(values))?;
    Ok(changed > 0)
}

/// Case-insensitive substring match on patient id or name, ordered by name.
/// `%` and `_` in the query are matched literally.
pub fn search_patients(conn: &Connection, query: &str) -> Result<Vec<Patient>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients
         WHERE LOWER(patient_id) LIKE LOWER(?1) ESCAPE '\\'
            OR LOWER(name) LIKE LOWER(?1) ESCAPE '\\'
         ORDER BY name"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern], row_to_patient)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(row?);
    }
    Ok(patients)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_patient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        address: row.get(6)?,
        blood_group: row.get(7)?,
        emergency_contact: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

use rusqlite::{params, Connection};

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::*;

use super::now_timestamp;

/// Append a prescription row. Returns `Ok(false)` on a duplicate id.
pub fn insert_prescription(
    conn: &Connection,
    record: &PrescriptionRecord,
) -> Result<bool, DatabaseError> {
    let result = conn.execute(
        "INSERT INTO prescriptions (prescription_id, patient_id, doctor_id, file_path,
         file_type, upload_date, diagnosis, medications, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.prescription_id,
            record.patient_id,
            record.doctor_id,
            record.file_path,
            record.file_type,
            now_timestamp(),
            record.diagnosis,
            record.medications,
            record.notes,
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// All prescriptions for a patient, newest first, with the uploading
/// doctor's name when known.
pub fn get_patient_prescriptions(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<PrescriptionEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.prescription_id, p.patient_id, p.doctor_id, p.file_path, p.file_type,
                p.diagnosis, p.medications, p.notes, p.upload_date, d.name
         FROM prescriptions p
         LEFT JOIN doctors d ON d.doctor_id = p.doctor_id
         WHERE p.patient_id = ?1
         ORDER BY p.upload_date DESC, p.id DESC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(PrescriptionEntry {
            record: PrescriptionRecord {
                prescription_id: row.get(0)?,
                patient_id: row.get(1)?,
                doctor_id: row.get(2)?,
                file_path: row.get(3)?,
                file_type: row.get(4)?,
                diagnosis: row.get(5)?,
                medications: row.get(6)?,
                notes: row.get(7)?,
            },
            upload_date: row.get(8)?,
            doctor_name: row.get(9)?,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

pub fn count_patient_prescriptions(
    conn: &Connection,
    patient_id: &str,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_patient, seed_demo_accounts};
    use crate::db::sqlite::open_memory_database;

    fn setup() -> Connection {
        let conn = open_memory_database().unwrap();
        seed_demo_accounts(&conn).unwrap();
        conn
    }

    fn record(id: &str, patient_id: &str, diagnosis: &str) -> PrescriptionRecord {
        PrescriptionRecord {
            prescription_id: id.into(),
            patient_id: patient_id.into(),
            doctor_id: Some("DOC001".into()),
            file_path: Some(format!("uploads/{id}.pdf")),
            file_type: Some("pdf".into()),
            diagnosis: Some(diagnosis.into()),
            medications: Some("[\"paracetamol 500mg\"]".into()),
            notes: None,
        }
    }

    #[test]
    fn insert_and_list_with_doctor_name() {
        let conn = setup();
        assert!(insert_prescription(&conn, &record("RX_1", "P001", "flu")).unwrap());

        let entries = get_patient_prescriptions(&conn, "P001").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.diagnosis.as_deref(), Some("flu"));
        assert_eq!(entries[0].doctor_name.as_deref(), Some("Dr. Rajesh Kumar"));
    }

    #[test]
    fn duplicate_prescription_id_rejected() {
        let conn = setup();
        assert!(insert_prescription(&conn, &record("RX_1", "P001", "flu")).unwrap());
        assert!(!insert_prescription(&conn, &record("RX_1", "P001", "cold")).unwrap());
        assert_eq!(count_patient_prescriptions(&conn, "P001").unwrap(), 1);
    }

    #[test]
    fn listing_is_newest_first() {
        let conn = setup();
        insert_prescription(&conn, &record("RX_old", "P001", "first")).unwrap();
        insert_prescription(&conn, &record("RX_new", "P001", "second")).unwrap();
        conn.execute(
            "UPDATE prescriptions SET upload_date = '2020-01-01 09:00:00' WHERE prescription_id = 'RX_old'",
            [],
        )
        .unwrap();

        let ids: Vec<String> = get_patient_prescriptions(&conn, "P001")
            .unwrap()
            .into_iter()
            .map(|e| e.record.prescription_id)
            .collect();
        assert_eq!(ids, vec!["RX_new", "RX_old"]);
    }

    #[test]
    fn same_second_uploads_keep_insertion_order_reversed() {
        let conn = setup();
        insert_prescription(&conn, &record("RX_a", "P001", "a")).unwrap();
        insert_prescription(&conn, &record("RX_b", "P001", "b")).unwrap();
        conn.execute("UPDATE prescriptions SET upload_date = '2024-05-01 10:00:00'", [])
            .unwrap();

        let entries = get_patient_prescriptions(&conn, "P001").unwrap();
        assert_eq!(entries[0].record.prescription_id, "RX_b");
    }

    #[test]
    fn count_is_per_patient() {
        let conn = setup();
        insert_patient(
            &conn,
            &NewPatient {
                patient_id: "P002".into(),
                name: "Second".into(),
                ..Default::default()
            },
        )
        .unwrap();
        insert_prescription(&conn, &record("RX_1", "P001", "flu")).unwrap();
        insert_prescription(&conn, &record("RX_2", "P001", "flu")).unwrap();
        insert_prescription(&conn, &record("RX_3", "P002", "cold")).unwrap();

        assert_eq!(count_patient_prescriptions(&conn, "P001").unwrap(), 2);
        assert_eq!(count_patient_prescriptions(&conn, "P002").unwrap(), 1);
        assert_eq!(count_patient_prescriptions(&conn, "P404").unwrap(), 0);
    }

    #[test]
    fn unknown_patient_violates_foreign_key() {
        let conn = setup();
        assert!(insert_prescription(&conn, &record("RX_1", "P404", "flu")).is_err());
    }
}

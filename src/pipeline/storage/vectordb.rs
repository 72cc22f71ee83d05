use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::types::{SummaryDocument, SummaryStore};
use super::StorageError;

pub const SUMMARY_DB_FILE: &str = "summaries.db";

/// SQLite-backed summary store.
///
/// Each collection is a logical partition of the `summary_documents` table.
/// Rows are never updated; the newest row per (collection, patient) is the
/// current summary and older rows remain as history.
pub struct SqliteSummaryStore {
    path: PathBuf,
}

impl SqliteSummaryStore {
    /// Open (or create) `summaries.db` inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        let store = Self {
            path: dir.join(SUMMARY_DB_FILE),
        };
        let conn = store.connect()?;
        conn.execute_batch(include_str!("../../../resources/migrations/summary_store.sql"))?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }
}

impl SummaryStore for SqliteSummaryStore {
    fn add(&self, doc: &SummaryDocument) -> Result<(), StorageError> {
        let conn = self.connect()?;
        let metadata = serde_json::to_string(&doc.metadata)?;
        conn.execute(
            "INSERT INTO summary_documents (doc_id, collection, patient_id, document, embedding,
             metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                doc.doc_id,
                doc.collection,
                doc.patient_id,
                doc.document,
                embedding_to_bytes(&doc.embedding),
                metadata,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn latest_for_patient(
        &self,
        collection: &str,
        patient_id: &str,
    ) -> Result<Option<String>, StorageError> {
        let conn = self.connect()?;
        let document = conn
            .query_row(
                "SELECT document FROM summary_documents
                 WHERE collection = ?1 AND patient_id = ?2
                 ORDER BY seq DESC LIMIT 1",
                params![collection, patient_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(document)
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
pub use test_stores::*;


#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn doc(doc_id: &str, collection: &str, patient_id: &str, text: &str) -> SummaryDocument {
        let mut metadata = BTreeMap::new();
        metadata.insert("patient_id".to_string(), patient_id.to_string());
        SummaryDocument {
            doc_id: doc_id.into(),
            collection: collection.into(),
            patient_id: patient_id.into(),
            document: text.into(),
            embedding: vec![0.5, -0.25, 0.0],
            metadata,
        }
    }

    #[test]
    fn latest_returns_most_recent_addition() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteSummaryStore::open(dir.path()).unwrap();

        store.add(&doc("P1_doctor_1", "doctor_summaries", "P1", "first")).unwrap();
        store.add(&doc("P1_doctor_2", "doctor_summaries", "P1", "second")).unwrap();

        let latest = store.latest_for_patient("doctor_summaries", "P1").unwrap();
        assert_eq!(latest.as_deref(), Some("second"));

        let conn = Connection::open(dir.path().join(SUMMARY_DB_FILE)).unwrap();
        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM summary_documents WHERE collection = 'doctor_summaries' AND patient_id = 'P1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn collections_and_patients_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteSummaryStore::open(dir.path()).unwrap();

        store.add(&doc("a", "doctor_summaries", "P1", "doctor view")).unwrap();
        store.add(&doc("b", "patient_summaries", "P1", "patient view")).unwrap();
        store.add(&doc("c", "doctor_summaries", "P10", "other patient")).unwrap();

        assert_eq!(
            store.latest_for_patient("patient_summaries", "P1").unwrap().as_deref(),
            Some("patient view")
        );
        assert_eq!(
            store.latest_for_patient("doctor_summaries", "P1").unwrap().as_deref(),
            Some("doctor view")
        );
        assert!(store.latest_for_patient("patient_summaries", "P10").unwrap().is_none());
    }

    #[test]
    fn reopen_keeps_documents() {
        let dir = tempfile::tempdir().unwrap();
        SqliteSummaryStore::open(dir.path())
            .unwrap()
            .add(&doc("x", "doctor_summaries", "P1", "kept"))
            .unwrap();

        let reopened = SqliteSummaryStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.latest_for_patient("doctor_summaries", "P1").unwrap().as_deref(),
            Some("kept")
        );
    }

    #[test]
    fn duplicate_doc_id_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteSummaryStore::open(dir.path()).unwrap();
        store.add(&doc("same", "doctor_summaries", "P1", "a")).unwrap();
        assert!(store.add(&doc("same", "doctor_summaries", "P1", "b")).is_err());
    }

    #[test]
    fn embedding_bytes_are_little_endian_f32() {
        let bytes = embedding_to_bytes(&[1.0, -2.0]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    }
}

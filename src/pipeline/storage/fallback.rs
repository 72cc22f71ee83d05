use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::StorageError;
use crate::models::Role;

pub const FALLBACK_FILE: &str = "patient_metadata.json";

/// Patient id → { `latest_summary_{role}`, `latest_prescription_{role}`, `last_updated` }
pub type FallbackData = BTreeMap<String, Map<String, Value>>;

/// JSON file holding the latest summary per (patient, role).
///
/// Every write re-reads the whole file and atomically replaces it. Two
/// concurrent writers can still lose one update.
pub struct FallbackStore {
    path: PathBuf,
}

pub fn summary_key(role: Role) -> String {
    format!("latest_summary_{}", role.as_str())
}

pub fn prescription_key(role: Role) -> String {
    format!("latest_prescription_{}", role.as_str())
}

impl FallbackStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(FALLBACK_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as empty.
    pub fn load(&self) -> Result<FallbackData, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FallbackData::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| StorageError::CorruptFallback {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn latest_summary(&self, patient_id: &str, role: Role) -> Result<Option<String>, StorageError> {
        let data = self.load()?;
        Ok(data
            .get(patient_id)
            .and_then(|entry| entry.get(&summary_key(role)))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Record the latest summary and the extracted data it was built from.
    pub fn record(
        &self,
        patient_id: &str,
        role: Role,
        summary: &str,
        extracted: &Value,
    ) -> Result<(), StorageError> {
        let mut data = self.load()?;
        let entry = data.entry(patient_id.to_string()).or_default();
        entry.insert(summary_key(role), Value::String(summary.to_string()));
        entry.insert(prescription_key(role), extracted.clone());
        entry.insert(
            "last_updated".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        self.save(&data)
    }

    fn save(&self, data: &FallbackData) -> Result<(), StorageError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, data)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

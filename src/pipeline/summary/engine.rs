use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::prompt::build_summary_prompt;
use super::SummaryError;
use crate::models::Role;
use crate::pipeline::extraction::ExtractedPrescription;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::storage::{
    flatten_metadata, EmbeddingModel, FallbackStore, StorageError, SummaryDocument, SummaryStore,
};

/// Keeps one running summary per (patient, role).
///
/// Each role reads and writes only its own partition, so the doctor and
/// patient summaries evolve independently.
pub struct SummaryEngine {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn SummaryStore>,
    fallback: FallbackStore,
}

impl SummaryEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingModel>,
        store: Arc<dyn SummaryStore>,
        fallback: FallbackStore,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            fallback,
        }
    }

    /// Current summary for (patient, role).
    ///
    /// The fallback file is written on every successful generation, before
    /// indexing, so its entry is never older than the newest vector row. The
    /// vector store is consulted only when the file has no entry or cannot be
    /// read. Lookup failures are logged and read as "none".
    pub fn get_existing_summary(&self, patient_id: &str, role: Role) -> Option<String> {
        match self.fallback.latest_summary(patient_id, role) {
            Ok(Some(summary)) => return Some(summary),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, role = role.as_str(), error = %e, "Fallback lookup failed, using vector store");
            }
        }

        match self.store.latest_for_patient(role.collection_name(), patient_id) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, role = role.as_str(), error = %e, "Vector store lookup failed");
                None
            }
        }
    }

    /// Merge `extracted` into `previous` for one role and persist the result.
    ///
    /// The fallback record is written first and its failure is an error.
    /// Indexing into the vector store is best effort.
    pub fn generate_summary(
        &self,
        extracted: &ExtractedPrescription,
        previous: Option<&str>,
        patient_id: &str,
        role: Role,
    ) -> Result<String, SummaryError> {
        let extracted_json = extracted.to_json();
        let pretty = serde_json::to_string_pretty(&extracted_json).unwrap_or_default();
        let prompt = build_summary_prompt(role, previous, &pretty);

        let summary = self.llm.generate(&prompt)?;

        self.fallback
            .record(patient_id, role, &summary, &extracted_json)?;

        if let Err(e) = self.index_summary(&summary, &extracted_json, patient_id, role) {
            tracing::warn!(patient_id = %patient_id, role = role.as_str(), error = %e, "Summary not indexed in vector store");
        }

        tracing::info!(
            patient_id = %patient_id,
            role = role.as_str(),
            had_previous = previous.is_some(),
            "Summary updated"
        );
        Ok(summary)
    }

    fn index_summary(
        &self,
        summary: &str,
        extracted: &Value,
        patient_id: &str,
        role: Role,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        let doc_id = format!(
            "{patient_id}_{}_{}.{:06}",
            role.as_str(),
            now.timestamp(),
            now.timestamp_subsec_micros()
        );

        let pid = Value::String(patient_id.to_string());
        let role_value = Value::String(role.as_str().to_string());
        let timestamp = Value::String(now.to_rfc3339());
        let null = Value::Null;
        let metadata = flatten_metadata([
            ("patient_id", &pid),
            ("role", &role_value),
            ("timestamp", &timestamp),
            ("diagnosis", extracted.get("diagnosis").unwrap_or(&null)),
            ("medications", extracted.get("medications").unwrap_or(&null)),
        ]);

        let embedding = self.embedder.embed(summary)?;
        self.store.add(&SummaryDocument {
            doc_id,
            collection: role.collection_name().to_string(),
            patient_id: patient_id.to_string(),
            document: summary.to_string(),
            embedding,
            metadata,
        })
    }
}

use std::collections::BTreeMap;

use super::StorageError;

/// Embedding model abstraction
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, StorageError>;
}

/// One summary generation, as written to the vector store.
#[derive(Debug, Clone)]
pub struct SummaryDocument {
    /// `{patient_id}_{role}_{timestamp}`
    pub doc_id: String,
    pub collection: String,
    pub patient_id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    /// Flat string metadata, see [`super::flatten_metadata`].
    pub metadata: BTreeMap<String, String>,
}

/// Vector store abstraction, partitioned into named collections.
pub trait SummaryStore: Send + Sync {
    fn add(&self, doc: &SummaryDocument) -> Result<(), StorageError>;

    /// Text of the most recently added document in `collection` whose
    /// `patient_id` matches exactly.
    fn latest_for_patient(
        &self,
        collection: &str,
        patient_id: &str,
    ) -> Result<Option<String>, StorageError>;
}

//! Shared application state.
//!
//! `CoreState` is built once at startup and handed to the router inside an
//! `Arc`. It owns the record store handle and the upload pipeline; model
//! clients live inside the pipeline.

use std::sync::Arc;

use crate::config::{AppConfig, ConfigError, EmbeddingProvider, LlmProvider};
use crate::db::{self, Database};
use crate::pipeline::extraction::DocumentExtractor;
use crate::pipeline::llm::{GeminiClient, LlmClient, LlmError, OllamaClient};
use crate::pipeline::processor::PrescriptionProcessor;
use crate::pipeline::storage::{
    EmbeddingModel, FallbackStore, HashEmbedder, SqliteSummaryStore, StorageError, SummaryStore,
};
use crate::pipeline::summary::SummaryEngine;

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Model client error: {0}")]
    Llm(#[from] LlmError),
    #[error("Summary store error: {0}")]
    Storage(#[from] StorageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct CoreState {
    pub config: AppConfig,
    db: Database,
    processor: PrescriptionProcessor,
}

impl CoreState {
    /// Open the stores and construct the configured model clients.
    ///
    /// Builds blocking HTTP clients, so it must run outside the tokio runtime.
    pub fn build(config: AppConfig) -> Result<Self, CoreError> {
        std::fs::create_dir_all(&config.upload_dir)?;
        let db = Database::open(&config.database_path)?;

        let llm = build_llm(&config)?;
        let embedder = build_embedder(&config)?;
        let store: Arc<dyn SummaryStore> =
            Arc::new(SqliteSummaryStore::open(&config.summary_store_dir)?);

        let summaries = SummaryEngine::new(
            llm.clone(),
            embedder,
            store,
            FallbackStore::new(&config.summary_store_dir),
        );
        let processor = PrescriptionProcessor::new(DocumentExtractor::new(llm), summaries);

        if !config.llm_configured() {
            tracing::warn!("GEMINI_API_KEY is not set; uploads will fail until it is configured");
        }
        tracing::info!(
            llm_provider = ?config.llm_provider,
            llm_model = %config.llm_model,
            embedding_provider = ?config.embedding_provider,
            "Core state ready"
        );

        Ok(Self {
            config,
            db,
            processor,
        })
    }

    /// Assemble from prebuilt parts.
    pub fn from_parts(config: AppConfig, db: Database, processor: PrescriptionProcessor) -> Self {
        Self {
            config,
            db,
            processor,
        }
    }

    /// Open a record store connection for one call scope.
    pub fn open_db(&self) -> Result<rusqlite::Connection, db::DatabaseError> {
        self.db.connect()
    }

    pub fn processor(&self) -> &PrescriptionProcessor {
        &self.processor
    }

    pub fn llm_configured(&self) -> bool {
        self.config.llm_configured()
    }

    /// Round-trip a trivial query.
    pub fn database_connected(&self) -> bool {
        self.db
            .connect()
            .and_then(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .is_ok()
    }
}

fn build_llm(config: &AppConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    Ok(match config.llm_provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            &config.llm_model,
            config.llm_timeout_secs,
        )?),
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            &config.ollama_url,
            &config.llm_model,
            config.llm_timeout_secs,
        )?),
    })
}

fn build_embedder(config: &AppConfig) -> Result<Arc<dyn EmbeddingModel>, LlmError> {
    Ok(match config.embedding_provider {
        EmbeddingProvider::Gemini => Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            &config.embedding_model,
            config.llm_timeout_secs,
        )?),
        EmbeddingProvider::Ollama => Arc::new(OllamaClient::new(
            &config.ollama_url,
            &config.embedding_model,
            config.llm_timeout_secs,
        )?),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &std::path::Path, extra: &[(&str, &str)]) -> AppConfig {
        let db = dir.join("records.db").display().to_string();
        let store = dir.join("patient_db").display().to_string();
        let uploads = dir.join("uploads").display().to_string();
        let mut pairs = vec![
            ("DATABASE_PATH".to_string(), db),
            ("SUMMARY_STORE_DIR".to_string(), store),
            ("UPLOAD_DIR".to_string(), uploads),
        ];
        pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        AppConfig::from_lookup(|key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
            .unwrap()
    }

    #[test]
    fn build_creates_stores_and_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::build(test_config(dir.path(), &[])).unwrap();

        assert!(dir.path().join("records.db").exists());
        assert!(dir.path().join("uploads").is_dir());
        assert!(dir.path().join("patient_db").join("summaries.db").exists());
        assert!(state.database_connected());
        assert!(!state.llm_configured());
    }

    #[test]
    fn key_marks_llm_configured() {
        let dir = tempfile::tempdir().unwrap();
        let state =
            CoreState::build(test_config(dir.path(), &[("GEMINI_API_KEY", "test-key")])).unwrap();
        assert!(state.llm_configured());
    }

    #[test]
    fn open_db_sees_seeded_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::build(test_config(dir.path(), &[])).unwrap();
        let conn = state.open_db().unwrap();
        assert!(db::patient_exists(&conn, "P001").unwrap());
    }
}

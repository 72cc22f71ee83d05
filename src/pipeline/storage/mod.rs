pub mod embedder;
pub mod fallback;
pub mod metadata;
pub mod types;
pub mod vectordb;

pub use embedder::*;
pub use fallback::*;
pub use metadata::*;
pub use types::*;
pub use vectordb::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vector DB error: {0}")]
    VectorDb(#[from] rusqlite::Error),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Fallback store {path} is unreadable: {reason}")]
    CorruptFallback { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

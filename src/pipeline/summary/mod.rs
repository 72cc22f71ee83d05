pub mod engine;
pub mod prompt;

pub use engine::*;
pub use prompt::*;

use thiserror::Error;

use crate::pipeline::llm::LlmError;
use crate::pipeline::storage::StorageError;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summary generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not record summary: {0}")]
    Storage(#[from] StorageError),
}

pub mod orchestrator;
pub mod parser;
pub mod pdf;
pub mod prompt;
pub mod sanitize;
pub mod types;

pub use orchestrator::*;
pub use parser::*;
pub use pdf::*;
pub use prompt::*;
pub use sanitize::*;
pub use types::*;

use thiserror::Error;

use crate::pipeline::llm::LlmError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),
}

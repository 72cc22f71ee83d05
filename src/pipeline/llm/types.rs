use super::LlmError;

/// An image passed inline to a vision-capable model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Standard base64 of the raw file bytes.
    pub data_base64: String,
}

/// Text-generation backend (allows mocking).
///
/// Implementations are blocking; async callers go through
/// `tokio::task::spawn_blocking`.
pub trait LlmClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    fn generate_with_image(&self, prompt: &str, image: &InlineImage) -> Result<String, LlmError>;
}

//! Google Gemini REST client (`generateContent`, `embedContent`).

use serde::{Deserialize, Serialize};

use super::types::{InlineImage, LlmClient};
use super::{build_http_client, check_status, map_send_error, LlmError};
use crate::pipeline::storage::{EmbeddingModel, StorageError};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// A missing key is allowed here; calls then fail with `NotConfigured`.
    pub fn new(api_key: Option<String>, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(GEMINI_BASE_URL, api_key, model, timeout_secs)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.trim_start_matches("models/").to_string(),
            client: build_http_client(timeout_secs)?,
            timeout_secs,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured("GEMINI_API_KEY"))
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let key = self.api_key()?;
        let url = format!("{}/models/{}:{}", self.base_url, self.model, method);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout_secs))?;

        check_status(response)?
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))
    }

    fn generate_parts(&self, parts: Vec<Part<'_>>) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };
        let parsed: GenerateContentResponse = self.post("generateContent", &body)?;
        parsed.into_text()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl LlmClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_parts(vec![Part::Text { text: prompt }])
    }

    fn generate_with_image(&self, prompt: &str, image: &InlineImage) -> Result<String, LlmError> {
        self.generate_parts(vec![
            Part::Text { text: prompt },
            Part::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data_base64,
                },
            },
        ])
    }
}

impl EmbeddingModel for GeminiClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>, StorageError> {
        let body = EmbedContentRequest {
            content: Content {
                parts: vec![Part::Text { text }],
            },
        };
        let parsed: EmbedContentResponse = self
            .post("embedContent", &body)
            .map_err(|e| StorageError::Embedding(e.to_string()))?;
        Ok(parsed.embedding.values)
    }
}

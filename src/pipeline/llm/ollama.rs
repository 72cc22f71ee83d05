use serde::{Deserialize, Serialize};

use super::types::{InlineImage, LlmClient};
use super::{build_http_client, check_status, map_send_error, LlmError};
use crate::pipeline::storage::{EmbeddingModel, StorageError};

pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Ollama HTTP client for local inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: build_http_client(timeout_secs)?,
            timeout_secs,
        })
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout_secs))?;

        check_status(response)?
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))
    }
}

/// Request body for `/api/generate`.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Vision requests go through `/api/chat`; chat-template models reject
/// images on `/api/generate`.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    images: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

fn non_empty(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text)
    }
}

impl LlmClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let parsed: GenerateResponse = self.post("/api/generate", &body)?;
        non_empty(parsed.response)
    }

    fn generate_with_image(&self, prompt: &str, image: &InlineImage) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                images: vec![&image.data_base64],
            }],
            stream: false,
        };
        let parsed: ChatResponse = self.post("/api/chat", &body)?;
        non_empty(parsed.message.content)
    }
}

impl EmbeddingModel for OllamaClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>, StorageError> {
        let body = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let parsed: EmbedResponse = self
            .post("/api/embed", &body)
            .map_err(|e| StorageError::Embedding(e.to_string()))?;
        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Embedding("Ollama returned no embeddings".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2-vision", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn chat_request_carries_images() {
        let body = ChatRequest {
            model: "llava",
            messages: vec![ChatMessage {
                role: "user",
                content: "read",
                images: vec!["QUJD"],
            }],
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["images"][0], "QUJD");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn empty_generation_is_an_error() {
        assert!(matches!(non_empty("  \n".into()), Err(LlmError::EmptyResponse)));
        assert_eq!(non_empty("ok".into()).unwrap(), "ok");
    }

    #[test]
    fn connection_refused_maps_to_connection_error() {
        let client = OllamaClient::new("http://127.0.0.1:1", "llama3", 2).unwrap();
        let err = client.generate("hello").unwrap_err();
        assert!(matches!(err, LlmError::Connection(_)));
    }
}

pub mod gemini;
pub mod ollama;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use gemini::*;
pub use ollama::*;
pub use types::*;

#[cfg(test)]
pub use mock::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Model server not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Model server returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Map a transport error from `reqwest` to an `LlmError`.
pub(crate) fn map_send_error(err: reqwest::Error, base_url: &str, timeout_secs: u64) -> LlmError {
    if err.is_connect() {
        LlmError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else {
        LlmError::HttpClient(err.to_string())
    }
}

/// Turn a non-2xx response into `LlmError::Api`, passing successes through.
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::HttpClient(e.to_string()))
}

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MediSummarize";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2-vision";
pub const DEFAULT_GEMINI_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medisummarize_lib=info,medisummarize=info,tower_http=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err("expected gemini or ollama".into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    Gemini,
    Ollama,
    Hash,
}

impl FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "hash" => Ok(Self::Hash),
            _ => Err("expected gemini, ollama or hash".into()),
        }
    }
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub summary_store_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub llm_provider: LlmProvider,
    pub gemini_api_key: Option<String>,
    pub llm_model: String,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: String,
    pub ollama_url: String,
    pub llm_timeout_secs: u64,
    pub session_lifetime_hours: i64,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY");
        let llm_provider: LlmProvider = parse_or(&get, "LLM_PROVIDER", LlmProvider::Gemini)?;

        let llm_model = get("LLM_MODEL").unwrap_or_else(|| {
            match llm_provider {
                LlmProvider::Gemini => DEFAULT_GEMINI_MODEL,
                LlmProvider::Ollama => DEFAULT_OLLAMA_MODEL,
            }
            .to_string()
        });

        let default_embedding = match llm_provider {
            LlmProvider::Gemini if gemini_api_key.is_some() => EmbeddingProvider::Gemini,
            LlmProvider::Gemini => EmbeddingProvider::Hash,
            LlmProvider::Ollama => EmbeddingProvider::Ollama,
        };
        let embedding_provider = parse_or(&get, "EMBEDDING_PROVIDER", default_embedding)?;
        let embedding_model = get("EMBEDDING_MODEL").unwrap_or_else(|| {
            match embedding_provider {
                EmbeddingProvider::Gemini => DEFAULT_GEMINI_EMBEDDING_MODEL,
                EmbeddingProvider::Ollama => DEFAULT_OLLAMA_EMBEDDING_MODEL,
                EmbeddingProvider::Hash => "hash",
            }
            .to_string()
        });

        let config = Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "PORT", 8080)?,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./medical_records.db")),
            summary_store_dir: get("SUMMARY_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./patient_db")),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            llm_provider,
            gemini_api_key,
            llm_model,
            embedding_provider,
            embedding_model,
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| "http://localhost:11434".into()),
            llm_timeout_secs: parse_or(&get, "LLM_TIMEOUT_SECS", 120)?,
            session_lifetime_hours: parse_or(&get, "SESSION_LIFETIME_HOURS", 12)?,
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 16 * 1024 * 1024)?,
        };

        if config.session_lifetime_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_LIFETIME_HOURS",
                value: config.session_lifetime_hours.to_string(),
                reason: "must be positive".into(),
            });
        }
        Ok(config)
    }

    /// Whether the configured generation backend can be called at all.
    pub fn llm_configured(&self) -> bool {
        match self.llm_provider {
            LlmProvider::Gemini => self.gemini_api_key.is_some(),
            LlmProvider::Ollama => true,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

//! Server configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_RAG_URL: &str = "http://rag:8000/chatbot/";
pub const DEFAULT_RAG_COLLECTION: &str = "enhanced_documents";
pub const DEFAULT_RAG_MODEL: &str = "llama3.1";
pub const DEFAULT_RAG_REQUEST_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_RAG_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RagTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Where and how questions are forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagConfig {
    pub url: String,
    pub collection: String,
    pub model: String,
    pub timeouts: RagTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub rag: RagConfig,
    /// Directory served at `/` (the built widget bundle), if any.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `PORT`: default 8000
    /// - `RAG_URL`: default `http://rag:8000/chatbot/`
    /// - `RAG_COLLECTION`: default `enhanced_documents`
    /// - `RAG_MODEL`: default `llama3.1`
    /// - `RAG_REQUEST_TIMEOUT_SECS`: default 600
    /// - `RAG_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STATIC_DIR`: unset disables static serving
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `PORT` or a timeout is set but
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let rag = RagConfig {
            url: env_or("RAG_URL", DEFAULT_RAG_URL),
            collection: env_or("RAG_COLLECTION", DEFAULT_RAG_COLLECTION),
            model: env_or("RAG_MODEL", DEFAULT_RAG_MODEL),
            timeouts: RagTimeouts {
                request_secs: env_parse("RAG_REQUEST_TIMEOUT_SECS", DEFAULT_RAG_REQUEST_TIMEOUT_SECS)?,
                connect_secs: env_parse("RAG_CONNECT_TIMEOUT_SECS", DEFAULT_RAG_CONNECT_TIMEOUT_SECS)?,
            },
        };
        let static_dir = env_trimmed("STATIC_DIR").map(PathBuf::from);

        Ok(Self { port, rag, static_dir })
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_trimmed(key).unwrap_or_else(|| default.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_trimmed(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { var: key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

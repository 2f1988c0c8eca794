//! Client for the retrieval-augmented generation (RAG) service.
//!
//! DESIGN
//! ======
//! Route handlers depend on the [`RagBackend`] trait so tests can swap in a
//! scripted backend. [`RagClient`] is the HTTP implementation: it posts
//! `{query, session_id, collection, model}` and reads the `response` field.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::RagConfig;

/// Returned as the reply when the RAG service answers without `response`.
pub const NO_RESPONSE_TEXT: &str = "No response was received.";

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never got an answer (connect failure, timeout).
    #[error("RAG request failed: {0}")]
    Request(String),

    /// The RAG service returned a non-success HTTP status.
    #[error("RAG response error: status {status}: {body}")]
    Status { status: u16, body: String },

    /// The RAG service body was not JSON.
    #[error("RAG response parse failed: {0}")]
    Parse(String),
}

/// Answers one question for one session.
#[async_trait::async_trait]
pub trait RagBackend: Send + Sync {
    /// Ask the RAG service and return its answer text.
    ///
    /// # Errors
    ///
    /// Returns a [`RagError`] for transport failures, non-2xx statuses, and
    /// non-JSON bodies.
    async fn ask(&self, query: &str, session_id: Option<&str>) -> Result<String, RagError>;
}

#[derive(Debug, Serialize)]
struct RagRequest<'a> {
    query: &'a str,
    session_id: Option<&'a str>,
    collection: &'a str,
    model: &'a str,
}

/// HTTP client for the RAG service.
pub struct RagClient {
    http: reqwest::Client,
    config: RagConfig,
}

impl RagClient {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::HttpClientBuild`] if the TLS backend fails to
    /// initialize.
    pub fn new(config: RagConfig) -> Result<Self, RagError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| RagError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait::async_trait]
impl RagBackend for RagClient {
    async fn ask(&self, query: &str, session_id: Option<&str>) -> Result<String, RagError> {
        let payload = RagRequest {
            query,
            session_id,
            collection: &self.config.collection,
            model: &self.config.model,
        };
        let resp = self
            .http
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RagError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RagError::Status { status: status.as_u16(), body });
        }

        let body: Value = resp.json().await.map_err(|e| RagError::Parse(e.to_string()))?;
        Ok(extract_answer(&body))
    }
}

/// Pull the answer text out of a RAG response body.
pub(crate) fn extract_answer(body: &Value) -> String {
    match body.get("response") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => NO_RESPONSE_TEXT.to_owned(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "rag_test.rs"]
mod tests;

//! `POST /chatbot/` — relays a widget turn to the RAG service.
//!
//! The body is parsed by hand instead of through the `Json` extractor so a
//! malformed request gets the same `{"error": ...}` shape as every other
//! failure.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Value, json};

use crate::state::AppState;

/// Turn payload sent by the widget. Any JSON body is accepted; only a
/// syntax error is a bad request.
#[derive(Debug, Default)]
pub struct TurnRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub history_len: usize,
}

impl TurnRequest {
    /// Pull the turn fields out of a decoded body.
    ///
    /// A non-string `message` is forwarded as its JSON text; null or missing
    /// becomes an empty query.
    pub fn from_value(body: &Value) -> Self {
        let message = match body.get("message") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let session_id = body.get("session_id").and_then(Value::as_str).map(str::to_owned);
        let history_len = body.get("history").and_then(Value::as_array).map_or(0, Vec::len);
        Self { message, session_id, history_len }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn relay(State(state): State<AppState>, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "invalid chatbot payload");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON payload.".to_owned());
        }
    };

    let turn = TurnRequest::from_value(&body);
    let session_id = turn.session_id.as_deref();
    tracing::info!(session_id = session_id.unwrap_or("-"), history = turn.history_len, "chatbot turn received");

    match state.rag.ask(&turn.message, session_id).await {
        Ok(reply) => Json(json!({ "reply": reply })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, session_id = session_id.unwrap_or("-"), "RAG request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("RAG service connection error: {e}"))
        }
    }
}

#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;

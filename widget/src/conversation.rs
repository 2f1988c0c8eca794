//! Conversation channel: one user turn to the backend and back.
//!
//! SYSTEM CONTEXT
//! ==============
//! A turn moves `Idle -> Sending -> {Success, TimedOut, NetworkError} -> Idle`.
//! The request and a timer race; whichever loses is dropped, and dropping a
//! browser request aborts the underlying fetch. The transcript view is told
//! about every step so the send control and busy indicator always track the
//! turn, including when the `send` future itself is dropped.
//!
//! DESIGN
//! ======
//! The session id and history are per-instance fields, so several widgets
//! (or tests) can run side by side. Network access, timers, and the
//! transcript are traits; the browser versions live in `dom`.

#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

use std::cell::{Cell, RefCell};
use std::time::Duration;

use futures::future::{self, Either};
use serde::{Deserialize, Serialize};

use crate::consts::{CHAT_ENDPOINT, CONNECTION_ERROR_TEXT, FALLBACK_REPLY, REQUEST_TIMEOUT_MS};

// =============================================================================
// MESSAGES
// =============================================================================

/// Author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One history entry, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Append-only conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History(Vec<Message>);

impl History {
    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Opaque per-instance session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id of the form `session_<32 hex chars>`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("session_{}", uuid::Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// JSON body posted for each turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: History,
    pub session_id: SessionId,
}

/// Decoded backend answer. Only a non-empty string `reply` counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: Option<String>,
}

impl ChatReply {
    /// Decode a response body.
    ///
    /// Any valid JSON is accepted; shapes without a string `reply` field
    /// decode as "no reply".
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::Parse`] if the body is not JSON at all.
    pub fn from_body(body: &str) -> Result<Self, TurnError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| TurnError::Parse(e.to_string()))?;
        let reply = value
            .get("reply")
            .and_then(serde_json::Value::as_str)
            .filter(|r| !r.is_empty())
            .map(str::to_owned);
        Ok(Self { reply })
    }
}

/// Why a turn produced no reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// The request never completed (offline, DNS, CORS, aborted).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("server error: status {0}")]
    Status(u16),

    /// The response body was not JSON.
    #[error("invalid response body: {0}")]
    Parse(String),

    /// No response arrived before the turn ceiling.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl TurnError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

// =============================================================================
// SEAMS
// =============================================================================

/// Posts a turn to the backend.
#[async_trait::async_trait(?Send)]
pub trait ChatTransport {
    /// Send `request` to `endpoint` and decode the answer.
    ///
    /// Dropping the returned future must cancel the request.
    ///
    /// # Errors
    ///
    /// Returns a [`TurnError`] for transport failures, non-2xx statuses, and
    /// undecodable bodies.
    async fn post(&self, endpoint: &str, request: &ChatRequest) -> Result<ChatReply, TurnError>;
}

/// Source of the turn timeout.
#[async_trait::async_trait(?Send)]
pub trait Timer {
    /// Resolve after `duration` has elapsed.
    async fn sleep(&self, duration: Duration);
}

/// Who a transcript bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    /// CSS modifier class for the bubble.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// Visible side of the conversation.
pub trait TranscriptView {
    /// Append a bubble to the transcript.
    fn append(&self, speaker: Speaker, text: &str);

    /// Empty the text input.
    fn clear_input(&self);

    /// Disable the send control and show the busy indicator, or undo both.
    fn set_busy(&self, busy: bool);
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Tunables for the conversation channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub fallback_reply: String,
    pub connection_error: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: CHAT_ENDPOINT.to_owned(),
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            fallback_reply: FALLBACK_REPLY.to_owned(),
            connection_error: CONNECTION_ERROR_TEXT.to_owned(),
        }
    }
}

/// Per-turn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    Sending,
}

/// Result of one [`ConversationChannel::send`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was blank; nothing happened.
    Skipped,
    /// Another turn is still in flight; nothing happened.
    Busy,
    /// The backend replied with this text.
    Replied(String),
    /// The backend answered without a reply; the fallback text was shown.
    Fallback,
    /// The turn failed; the connection-error text was shown.
    Failed(TurnError),
}

/// Sends user turns and keeps the conversation history.
pub struct ConversationChannel<T, C, V> {
    transport: T,
    timer: C,
    view: V,
    config: ChannelConfig,
    session_id: SessionId,
    history: RefCell<History>,
    state: Cell<TurnState>,
}

impl<T: ChatTransport, C: Timer, V: TranscriptView> ConversationChannel<T, C, V> {
    pub fn new(transport: T, timer: C, view: V) -> Self {
        Self::with_config(transport, timer, view, ChannelConfig::default())
    }

    pub fn with_config(transport: T, timer: C, view: V, config: ChannelConfig) -> Self {
        Self {
            transport,
            timer,
            view,
            config,
            session_id: SessionId::generate(),
            history: RefCell::new(History::default()),
            state: Cell::new(TurnState::Idle),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> TurnState {
        self.state.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Snapshot of the history so far.
    pub fn history(&self) -> History {
        self.history.borrow().clone()
    }

    /// Run one turn for `text`.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Skipped;
        }
        if self.state.get() == TurnState::Sending {
            log::debug!("chatbot turn already in flight, ignoring send");
            return SendOutcome::Busy;
        }

        self.view.append(Speaker::User, text);
        let request = {
            let mut history = self.history.borrow_mut();
            history.push(Message::user(text));
            ChatRequest { message: text.to_owned(), history: history.clone(), session_id: self.session_id.clone() }
        };
        self.view.clear_input();
        let _turn = TurnGuard::enter(&self.state, &self.view);

        log::debug!("sending chatbot turn: session={} history={}", self.session_id, request.history.len());
        match self.exchange(&request).await {
            Ok(ChatReply { reply: Some(reply) }) => {
                self.append_assistant(&reply);
                SendOutcome::Replied(reply)
            }
            Ok(ChatReply { reply: None }) => {
                let fallback = self.config.fallback_reply.clone();
                self.append_assistant(&fallback);
                SendOutcome::Fallback
            }
            Err(err) => {
                if err.is_timeout() {
                    log::warn!("chatbot turn abandoned: {err}");
                } else {
                    log::warn!("chatbot turn failed: {err}");
                }
                self.view.append(Speaker::Bot, &self.config.connection_error);
                SendOutcome::Failed(err)
            }
        }
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<ChatReply, TurnError> {
        let post = self.transport.post(&self.config.endpoint, request);
        let deadline = self.timer.sleep(self.config.timeout);
        match future::select(post, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(TurnError::Timeout(self.config.timeout)),
        }
    }

    fn append_assistant(&self, text: &str) {
        self.view.append(Speaker::Bot, text);
        self.history.borrow_mut().push(Message::assistant(text));
    }
}

/// Marks a turn as sending for its lifetime and restores the idle UI on
/// every exit path.
struct TurnGuard<'a, V: TranscriptView> {
    state: &'a Cell<TurnState>,
    view: &'a V,
}

impl<'a, V: TranscriptView> TurnGuard<'a, V> {
    fn enter(state: &'a Cell<TurnState>, view: &'a V) -> Self {
        state.set(TurnState::Sending);
        view.set_busy(true);
        Self { state, view }
    }
}

impl<V: TranscriptView> Drop for TurnGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_busy(false);
        self.state.set(TurnState::Idle);
    }
}

/// Whether a key press in the input should submit the turn.
///
/// Enter submits; Shift+Enter is left to the input.
#[must_use]
pub fn is_submit_key(key: &str, shift: bool) -> bool {
    key == "Enter" && !shift
}

//! Shared constants: storage keys, endpoint, timings, fixed user-facing text,
//! and the element IDs the host page must provide.

/// `localStorage` key holding the visibility token (`"true"` / `"false"`).
pub const VISIBLE_KEY: &str = "chatbot_visible";

/// `localStorage` key holding the JSON-encoded `{left, top}` position.
pub const POSITION_KEY: &str = "chatbot_pos";

/// Relative path the conversation channel posts to.
pub const CHAT_ENDPOINT: &str = "/chatbot/";

/// Ceiling for a single turn before the request is aborted.
pub const REQUEST_TIMEOUT_MS: u64 = 600_000;

/// Inset from the bottom-right corner used when no saved position exists.
pub const DEFAULT_CORNER_INSET_PX: f64 = 20.0;

/// Shown as the assistant turn when the backend answers without a reply.
pub const FALLBACK_REPLY: &str = "Sorry, I can't answer right now. Please try again.";

/// Shown in the transcript when a turn fails for any reason.
pub const CONNECTION_ERROR_TEXT: &str = "There was a connection error. Please try again.";

/// Class toggled on the container (hidden) and the open button (shown).
pub const MINIMIZED_CLASS: &str = "minimized";

/// Class toggled on the busy indicator while it is not shown.
pub const HIDDEN_CLASS: &str = "hidden";

pub const CONTAINER_ID: &str = "chatbot";
pub const OPEN_BUTTON_ID: &str = "chatbot-open";
pub const MINIMIZE_BUTTON_ID: &str = "minimize-chatbot";
pub const CLOSE_BUTTON_ID: &str = "close-chatbot";
pub const HEADER_ID: &str = "chatbot-header";
pub const MESSAGES_ID: &str = "chatbot-messages";
pub const INPUT_ID: &str = "user-input";
pub const SEND_BUTTON_ID: &str = "send-message";
pub const SPINNER_ID: &str = "loading-spinner";

use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::block_on;

use super::*;

// =============================================================
// Fakes
// =============================================================

#[derive(Default)]
struct RecordingView {
    entries: RefCell<Vec<(Speaker, String)>>,
    input_clears: Cell<u32>,
    busy: Cell<bool>,
    busy_changes: RefCell<Vec<bool>>,
}

impl RecordingView {
    fn entries(&self) -> Vec<(Speaker, String)> {
        self.entries.borrow().clone()
    }
}

impl TranscriptView for RecordingView {
    fn append(&self, speaker: Speaker, text: &str) {
        self.entries.borrow_mut().push((speaker, text.to_owned()));
    }

    fn clear_input(&self) {
        self.input_clears.set(self.input_clears.get() + 1);
    }

    fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
        self.busy_changes.borrow_mut().push(busy);
    }
}

/// Answers every post with a fixed result and records what was sent.
struct ScriptedTransport {
    result: Result<ChatReply, TurnError>,
    calls: RefCell<Vec<(String, ChatRequest)>>,
}

impl ScriptedTransport {
    fn replying(body: &str) -> Self {
        Self { result: ChatReply::from_body(body), calls: RefCell::default() }
    }

    fn failing(err: TurnError) -> Self {
        Self { result: Err(err), calls: RefCell::default() }
    }
}

#[async_trait::async_trait(?Send)]
impl ChatTransport for ScriptedTransport {
    async fn post(&self, endpoint: &str, request: &ChatRequest) -> Result<ChatReply, TurnError> {
        self.calls.borrow_mut().push((endpoint.to_owned(), request.clone()));
        self.result.clone()
    }
}

/// Sets its flag when dropped.
struct DropProbe(Rc<Cell<bool>>);

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

/// Never answers; flags when the pending request is dropped.
#[derive(Default)]
struct HangingTransport {
    dropped: Rc<Cell<bool>>,
}

#[async_trait::async_trait(?Send)]
impl ChatTransport for HangingTransport {
    async fn post(&self, _endpoint: &str, _request: &ChatRequest) -> Result<ChatReply, TurnError> {
        let _probe = DropProbe(Rc::clone(&self.dropped));
        future::pending::<()>().await;
        Err(TurnError::Network("unreachable".to_owned()))
    }
}

/// Answers once the test releases the gate.
struct GatedTransport {
    gate: RefCell<Option<oneshot::Receiver<ChatReply>>>,
}

#[async_trait::async_trait(?Send)]
impl ChatTransport for GatedTransport {
    async fn post(&self, _endpoint: &str, _request: &ChatRequest) -> Result<ChatReply, TurnError> {
        let gate = self.gate.borrow_mut().take();
        match gate {
            Some(rx) => rx.await.map_err(|_| TurnError::Network("gate dropped".to_owned())),
            None => Err(TurnError::Network("gate already used".to_owned())),
        }
    }
}

/// A timer that never fires.
struct NeverTimer;

#[async_trait::async_trait(?Send)]
impl Timer for NeverTimer {
    async fn sleep(&self, _duration: Duration) {
        future::pending::<()>().await;
    }
}

/// A timer that fires immediately and remembers the requested duration.
#[derive(Default)]
struct InstantTimer {
    requested: Cell<Option<Duration>>,
}

#[async_trait::async_trait(?Send)]
impl Timer for InstantTimer {
    async fn sleep(&self, duration: Duration) {
        self.requested.set(Some(duration));
    }
}

// =============================================================
// Blank input
// =============================================================

#[test]
fn blank_input_is_skipped_without_request() {
    let channel = ConversationChannel::new(ScriptedTransport::replying("{}"), NeverTimer, RecordingView::default());

    assert_eq!(block_on(channel.send("")), SendOutcome::Skipped);
    assert_eq!(block_on(channel.send("   \n\t")), SendOutcome::Skipped);

    assert!(channel.view().entries().is_empty());
    assert!(channel.history().is_empty());
    assert!(channel.transport.calls.borrow().is_empty());
    assert!(channel.view().busy_changes.borrow().is_empty());
    assert_eq!(channel.view().input_clears.get(), 0);
}

// =============================================================
// Successful turns
// =============================================================

#[test]
fn reply_is_appended_to_transcript_and_history() {
    let channel =
        ConversationChannel::new(ScriptedTransport::replying(r#"{"reply":"hi"}"#), NeverTimer, RecordingView::default());

    let outcome = block_on(channel.send("hello"));

    assert_eq!(outcome, SendOutcome::Replied("hi".to_owned()));
    assert_eq!(
        channel.view().entries(),
        vec![(Speaker::User, "hello".to_owned()), (Speaker::Bot, "hi".to_owned())]
    );
    assert_eq!(channel.history().messages(), &[Message::user("hello"), Message::assistant("hi")]);
    assert_eq!(channel.view().input_clears.get(), 1);
    assert_eq!(*channel.view().busy_changes.borrow(), vec![true, false]);
    assert_eq!(channel.state(), TurnState::Idle);
}

#[test]
fn input_is_trimmed_before_sending() {
    let channel =
        ConversationChannel::new(ScriptedTransport::replying(r#"{"reply":"ok"}"#), NeverTimer, RecordingView::default());

    block_on(channel.send("  hello \n"));

    assert_eq!(channel.view().entries()[0], (Speaker::User, "hello".to_owned()));
    assert_eq!(channel.transport.calls.borrow()[0].1.message, "hello");
}

#[test]
fn request_carries_message_history_and_session() {
    let channel =
        ConversationChannel::new(ScriptedTransport::replying(r#"{"reply":"one"}"#), NeverTimer, RecordingView::default());

    block_on(channel.send("first"));
    block_on(channel.send("second"));

    let calls = channel.transport.calls.borrow();
    assert_eq!(calls.len(), 2);
    let (endpoint, request) = &calls[1];
    assert_eq!(endpoint, "/chatbot/");
    assert_eq!(request.message, "second");
    assert_eq!(
        request.history.messages(),
        &[Message::user("first"), Message::assistant("one"), Message::user("second")]
    );
    assert_eq!(&request.session_id, channel.session_id());
    assert_eq!(calls[0].1.session_id, calls[1].1.session_id);

    let json = serde_json::to_value(request).unwrap();
    assert_eq!(json["message"], "second");
    assert_eq!(json["history"][0], serde_json::json!({ "role": "user", "content": "first" }));
    assert_eq!(json["history"][1]["role"], "assistant");
    assert_eq!(json["session_id"], channel.session_id().as_str());
}

#[test]
fn missing_reply_uses_fallback_as_assistant_turn() {
    let channel = ConversationChannel::new(ScriptedTransport::replying("{}"), NeverTimer, RecordingView::default());

    assert_eq!(block_on(channel.send("hello")), SendOutcome::Fallback);

    assert_eq!(channel.view().entries()[1], (Speaker::Bot, FALLBACK_REPLY.to_owned()));
    assert_eq!(channel.history().messages(), &[Message::user("hello"), Message::assistant(FALLBACK_REPLY)]);
}

#[test]
fn empty_reply_uses_fallback() {
    let channel =
        ConversationChannel::new(ScriptedTransport::replying(r#"{"reply":""}"#), NeverTimer, RecordingView::default());
    assert_eq!(block_on(channel.send("hello")), SendOutcome::Fallback);
}

#[test]
fn custom_fallback_text_is_used() {
    let config = ChannelConfig { fallback_reply: "nothing yet".to_owned(), ..ChannelConfig::default() };
    let channel =
        ConversationChannel::with_config(ScriptedTransport::replying("[]"), NeverTimer, RecordingView::default(), config);

    block_on(channel.send("hello"));
    assert_eq!(channel.view().entries()[1], (Speaker::Bot, "nothing yet".to_owned()));
}

// =============================================================
// Failures
// =============================================================

#[test]
fn transport_failure_shows_connection_error_without_history_entry() {
    let channel =
        ConversationChannel::new(ScriptedTransport::failing(TurnError::Status(502)), NeverTimer, RecordingView::default());

    let outcome = block_on(channel.send("hello"));

    assert_eq!(outcome, SendOutcome::Failed(TurnError::Status(502)));
    assert_eq!(
        channel.view().entries(),
        vec![(Speaker::User, "hello".to_owned()), (Speaker::Bot, CONNECTION_ERROR_TEXT.to_owned())]
    );
    assert_eq!(channel.history().messages(), &[Message::user("hello")]);
    assert!(!channel.view().busy.get());
}

#[test]
fn parse_failure_is_a_failed_turn() {
    let channel =
        ConversationChannel::new(ScriptedTransport::replying("<html>"), NeverTimer, RecordingView::default());
    assert!(matches!(block_on(channel.send("hello")), SendOutcome::Failed(TurnError::Parse(_))));
}

#[test]
fn timeout_aborts_request_and_reenables_send() {
    let channel = ConversationChannel::new(HangingTransport::default(), InstantTimer::default(), RecordingView::default());

    let outcome = block_on(channel.send("hello"));

    let timeout = Duration::from_millis(600_000);
    assert_eq!(outcome, SendOutcome::Failed(TurnError::Timeout(timeout)));
    assert!(channel.transport.dropped.get(), "pending request must be dropped");
    assert_eq!(channel.timer.requested.get(), Some(timeout));
    assert_eq!(channel.view().entries()[1], (Speaker::Bot, CONNECTION_ERROR_TEXT.to_owned()));
    assert_eq!(channel.history().len(), 1);
    assert!(!channel.view().busy.get());
    assert_eq!(channel.state(), TurnState::Idle);
}

#[test]
fn timeout_error_is_distinguishable() {
    let err = TurnError::Timeout(Duration::from_secs(600));
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "request timed out after 600s");
    assert!(!TurnError::Network("offline".to_owned()).is_timeout());
}

// =============================================================
// Turn lifecycle
// =============================================================

#[test]
fn second_send_while_in_flight_is_busy() {
    let (tx, rx) = oneshot::channel();
    let transport = GatedTransport { gate: RefCell::new(Some(rx)) };
    let channel = ConversationChannel::new(transport, NeverTimer, RecordingView::default());

    let chan = &channel;
    let (first, second) = block_on(async move {
        let first = chan.send("one");
        let second = async move {
            let outcome = chan.send("two").await;
            tx.send(ChatReply { reply: Some("done".to_owned()) }).unwrap();
            outcome
        };
        futures::join!(first, second)
    });

    assert_eq!(first, SendOutcome::Replied("done".to_owned()));
    assert_eq!(second, SendOutcome::Busy);
    assert_eq!(channel.history().messages(), &[Message::user("one"), Message::assistant("done")]);
}

#[test]
fn dropping_send_mid_flight_restores_idle_ui() {
    let channel = ConversationChannel::new(HangingTransport::default(), NeverTimer, RecordingView::default());

    block_on(async {
        let mut turn = Box::pin(channel.send("hello"));
        assert!(futures::poll!(turn.as_mut()).is_pending());
        assert!(channel.view().busy.get());
        assert_eq!(channel.state(), TurnState::Sending);
    });

    assert!(!channel.view().busy.get());
    assert_eq!(channel.state(), TurnState::Idle);
    assert!(channel.transport.dropped.get());
}

// =============================================================
// Wire decoding and helpers
// =============================================================

#[test]
fn reply_decoding_ignores_other_shapes() {
    assert_eq!(ChatReply::from_body(r#"{"reply":"x"}"#).unwrap().reply.as_deref(), Some("x"));
    assert_eq!(ChatReply::from_body(r#"{"reply":5}"#).unwrap().reply, None);
    assert_eq!(ChatReply::from_body(r#"{"error":"boom"}"#).unwrap().reply, None);
    assert_eq!(ChatReply::from_body("null").unwrap().reply, None);
    assert_eq!(ChatReply::from_body(r#""text""#).unwrap().reply, None);
    assert!(matches!(ChatReply::from_body("not json"), Err(TurnError::Parse(_))));
}

#[test]
fn session_ids_are_unique_and_prefixed() {
    let a = SessionId::generate();
    let b = SessionId::generate();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("session_"));
    assert_eq!(a.as_str().len(), "session_".len() + 32);
}

#[test]
fn enter_without_shift_submits() {
    assert!(is_submit_key("Enter", false));
    assert!(!is_submit_key("Enter", true));
    assert!(!is_submit_key("a", false));
}

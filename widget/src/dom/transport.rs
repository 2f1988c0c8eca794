//! Fetch-backed [`ChatTransport`] and timer.

use std::time::Duration;

use web_sys::{AbortController, AbortSignal};

use crate::conversation::{ChatReply, ChatRequest, ChatTransport, Timer, TurnError};

/// Posts turns with `fetch` via `gloo-net`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

/// Aborts the in-flight fetch unless disarmed first.
struct AbortOnDrop {
    controller: AbortController,
    armed: bool,
}

impl AbortOnDrop {
    fn new() -> Result<Self, TurnError> {
        let controller = AbortController::new().map_err(|e| TurnError::Network(format!("{e:?}")))?;
        Ok(Self { controller, armed: true })
    }

    fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            log::debug!("aborting in-flight chatbot request");
            self.controller.abort();
        }
    }
}

#[async_trait::async_trait(?Send)]
impl ChatTransport for FetchTransport {
    async fn post(&self, endpoint: &str, request: &ChatRequest) -> Result<ChatReply, TurnError> {
        let mut abort = AbortOnDrop::new()?;
        let signal = abort.signal();
        let resp = gloo_net::http::Request::post(endpoint)
            .abort_signal(Some(&signal))
            .json(request)
            .map_err(|e| TurnError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| TurnError::Network(e.to_string()))?;
        if !resp.ok() {
            return Err(TurnError::Status(resp.status()));
        }
        let body = resp.text().await.map_err(|e| TurnError::Network(e.to_string()))?;
        abort.disarm();
        ChatReply::from_body(&body)
    }
}

/// `setTimeout`-backed timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait::async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

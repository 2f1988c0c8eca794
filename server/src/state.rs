//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the RAG backend behind an `Arc<dyn RagBackend>` so tests can inject
//! a scripted backend.

use std::sync::Arc;

use crate::rag::RagBackend;

#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<dyn RagBackend>,
}

impl AppState {
    #[must_use]
    pub fn new(rag: Arc<dyn RagBackend>) -> Self {
        Self { rag }
    }
}

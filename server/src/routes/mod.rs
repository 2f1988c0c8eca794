//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The relay exposes the widget's single endpoint plus a health check. When a
//! static directory is configured (the built widget bundle and a host page),
//! it is served for every other path.

pub mod chatbot;

use std::path::Path;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/chatbot/", post(chatbot::relay))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

mod config;
mod rag;
mod routes;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let client = rag::RagClient::new(config.rag.clone()).expect("RAG client init failed");
    tracing::info!(
        url = client.url(),
        collection = %config.rag.collection,
        model = %config.rag.model,
        "RAG client initialized"
    );

    let state = state::AppState::new(Arc::new(client));
    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
    }

    let app = routes::app(state, config.static_dir.as_deref());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "chatbot relay listening");
    axum::serve(listener, app).await.expect("server failed");
}

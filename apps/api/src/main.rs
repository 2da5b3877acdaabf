mod assessment;
mod careers;
mod chat;
mod config;
mod errors;
mod llm_client;
mod rag;
mod recommendation;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::careers::CareerCatalog;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::rag::{RagBridge, WorkerConfig};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Disha API v{}", env!("CARGO_PKG_VERSION"));

    // Load the static career catalog once; it never changes while running.
    let catalog = Arc::new(CareerCatalog::load(Path::new(&config.careers_catalog_path))?);
    info!("Career catalog loaded ({} entries)", catalog.len());

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // The bridge spawns the worker lazily on the first chat request; first
    // initialization builds the vector store and can take a while.
    let rag = Arc::new(RagBridge::new(WorkerConfig {
        command: config.worker_command.clone(),
        args: vec![config.worker_script.clone()],
        careers_json_path: config.careers_json_path.clone(),
        chroma_persist_dir: config.chroma_persist_dir.clone(),
        provider: config.rag_provider.clone(),
    }));

    let state = AppState {
        catalog,
        rag: Arc::clone(&rag),
        llm,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Reject anything still in flight and terminate the worker.
    rag.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

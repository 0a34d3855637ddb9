//! Promptea API - prompt search and OpenAI proxy server

use std::sync::Arc;

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_prompts::{OpenAiEmbeddings, PromptSearchService, QdrantPromptStore};
use tokio::signal;
use tracing::info;

mod api;
mod config;

use api::openai::OpenAiProxy;
use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to Qdrant at {}", config.qdrant.url);
    let store = QdrantPromptStore::new(config.qdrant.clone())?;
    let embedder = Arc::new(OpenAiEmbeddings::new(config.openai.clone())?);
    let service = Arc::new(PromptSearchService::new(store, embedder));

    let proxy = OpenAiProxy::new(config.openai.clone())?;
    let app = api::app(service, proxy, &config.allowed_origins)?;

    let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
    info!("Promptea API listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Promptea API shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}

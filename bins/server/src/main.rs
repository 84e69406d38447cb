//! Linkdrop API Server
//!
//! Main entry point for the upload-to-Dropbox service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkdrop_api::{AppState, create_router};
use linkdrop_core::credential::ClientCredentials;
use linkdrop_core::ingest::{MultipartIngester, UploadLimits};
use linkdrop_core::pipeline::UploadPipeline;
use linkdrop_dropbox::DropboxClient;
use linkdrop_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkdrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(dropbox = ?config.dropbox, "Configuration loaded");

    let client = DropboxClient::from_config(&config.dropbox)?;
    let pipeline = UploadPipeline::new(
        Arc::new(client),
        ClientCredentials::from(&config.dropbox),
        config.dropbox.folder.clone(),
    );

    let limits = UploadLimits::from(&config.upload);
    info!(
        max_files = limits.max_files,
        max_file_size = limits.max_file_size,
        body_limit = limits.request_body_limit(),
        "Upload limits configured"
    );
    let state = AppState::new(pipeline, MultipartIngester::new(limits));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

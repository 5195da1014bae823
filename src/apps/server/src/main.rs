use anyhow::Context;
use campus_core::{ChatConfig, ChatService};
use campus_server::logging::{init_logging, LogConfig};
use campus_server::{build_router, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "campus-server", version, about = "Campus Assistant chat server")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`
    #[arg(long)]
    bind: Option<String>,

    /// Debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::new(cli.debug))?;

    let config = ChatConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());

    let service = ChatService::from_config(&config).context("Failed to build chat service")?;
    info!(
        "Chat service ready: model={}, tools={:?}, moderation={}",
        config.model.model,
        service.tool_names(),
        config.moderation.enabled
    );

    let app = build_router(AppState::new(Arc::new(service)));
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Campus Assistant server listening: addr={}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

//! TalentHub Backend Server
//!
//! Entry point for the talenthub-backend server: configuration loading,
//! job runner wiring and HTTP server startup.

use std::sync::Arc;

use tokio::net::TcpListener;

use talenthub_backend::state::AppState;

mod cli;
mod config_helpers;
mod tracing_setup;

use cli::CliArgs;
use config_helpers::{log_dispatch_posture, parse_bind_address};
use tracing_setup::install_tracing_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.help_requested {
        CliArgs::print_help();
        return Ok(());
    }

    // Resolve config path: CLI > environment variable
    let config_path = args
        .config_path
        .or_else(|| std::env::var("TALENTHUB_CONFIG_PATH").ok());

    eprintln!("[STARTUP] Loading config from: {:?}", config_path);
    let config = load_config(&config_path)?;

    if args.check_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    install_tracing_from_config(&config.logging);
    tracing::info!(
        environment = %config.environment,
        callback_path = %config.queue.callback_path,
        dedup_enabled = config.dispatch.dedup_enabled,
        "configuration loaded"
    );
    log_dispatch_posture(&config);

    let runner = talenthub_jobs::build_runner()?;
    let state = AppState::from_config(&config, runner)?;
    if let Some(url) = state.queue.callback_url() {
        tracing::info!(callback_url = url, "jobs will be delivered to callback url");
    }

    let app = talenthub_backend::build_router(Arc::new(state));

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Load and validate configuration from file or defaults.
fn load_config(path: &Option<String>) -> anyhow::Result<talenthub_config::Config> {
    let loaded = match path.as_deref() {
        Some(p) => talenthub_config::load_config(Some(p)),
        None => talenthub_config::load_config::<&std::path::Path>(None),
    };
    let config = loaded.map_err(|e| {
        eprintln!("failed to load configuration: {e}");
        anyhow::anyhow!(e.to_string())
    })?;
    talenthub_config::validate_config(&config).map_err(|e| {
        eprintln!("invalid configuration: {e}");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use validation_core::telemetry::{init_tracing, level_for};
use validationd::{create_app, AppState, Cli, SeedData, ServiceConfig, Stores};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.json, level_for(cli.verbose));

    let config = ServiceConfig::try_from(cli).context("Invalid configuration")?;

    let stores = Stores::open(&config.store)
        .await
        .context("Failed to open validation store")?;

    if let Some(path) = &config.seed {
        SeedData::load(path)
            .context("Failed to load seed data")?
            .apply(&stores)
            .await
            .context("Failed to store seed data")?;
    }

    let app = create_app(
        AppState::new(&stores, config.tokens.clone()),
        config.request_timeout,
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(
        addr = %config.bind,
        tokens = config.tokens.len(),
        "validationd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("validationd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

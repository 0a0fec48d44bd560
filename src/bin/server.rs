//! Dayplan HTTP server binary.
//!
//! Loads `.env`, assembles configuration from the environment, wires the
//! live upstream clients into the gateway, and serves until ctrl-c.

use std::sync::Arc;

use tokio::signal;
use tracing::info;

use dayplan::cloudkit::{CloudKitClient, CloudKitConfig};
use dayplan::completion::{ChatCompletionClient, CompletionConfig};
use dayplan::config::AppConfig;
use dayplan::gateway::{AppState, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first so the filter and config both see .env values.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let completion = ChatCompletionClient::new(
        CompletionConfig::new(config.upstream.api_key.clone(), config.upstream.api_url.clone())
            .with_model(config.upstream.model.clone()),
    );
    let records = CloudKitClient::new(CloudKitConfig::new(
        config.cloudkit.container.clone(),
        config.cloudkit.environment.clone(),
        config.cloudkit.api_token.clone(),
    ));

    let state = AppState {
        completion: Arc::new(completion),
        records: Arc::new(records),
        planner: config.planner.clone(),
    };

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!("dayplan listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}

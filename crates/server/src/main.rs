use std::sync::Arc;

use anyhow::Context;
use db::DBService;
use server::{AppState, config::ServerConfig, routes};
use services::services::{identity::EmailIdentityProvider, revalidation::Revalidator};
use tracing::info;
use utils::log::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let db = DBService::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open database at {}", config.database_url))?;

    let identity = Arc::new(EmailIdentityProvider::new(db.pool.clone()));
    let state = AppState::new(db, identity, Revalidator::new());

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
    }
}

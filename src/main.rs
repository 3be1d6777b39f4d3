// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::decision_service::DecisionService;
use crate::application::run_repository::RunDataRepository;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::fixture_repository::FixtureRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(FixtureRepository::new(&app_config.data.source));

    // Warm the cache so the first request does not pay for the load
    let dataset = repository.load_dataset().await;
    if dataset.is_empty() {
        tracing::warn!("No run data available from {}", app_config.data.source);
    }

    // Create services (application layer)
    let decision_service = DecisionService::new(repository);

    let state = Arc::new(AppState { decision_service });

    // Start server
    let addr = app_config.server.socket_addr()?;
    tracing::info!("Starting thermotrace service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}

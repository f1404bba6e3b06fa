//! # ecohubd, the ecohub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Construct the in-memory repositories and application services
//! - Build the hub client and run the Nobø integration's setup
//! - Start the integration's update task
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C), then tear the integration down
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ecohub_adapter_http_axum::router;
use ecohub_adapter_http_axum::state::AppState;
use ecohub_adapter_nobo::{NoboIntegration, SimulatedHub};
use ecohub_adapter_storage_memory::{MemoryDeviceRepository, MemoryEntityRepository};
use ecohub_app::event_bus::InProcessEventBus;
use ecohub_app::ports::Integration;
use ecohub_app::services::device_service::DeviceService;
use ecohub_app::services::entity_service::EntityService;
use ecohub_app::services::integration_context::ServiceContext;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter).context("invalid log filter")?)
        .init();

    // Repositories
    let entity_repo = MemoryEntityRepository::new();
    let device_repo = MemoryDeviceRepository::new();

    // Event bus
    let event_bus = InProcessEventBus::new(256);

    // Services
    let entity_service = Arc::new(EntityService::new(entity_repo, event_bus));
    let device_service = Arc::new(DeviceService::new(device_repo));
    let ctx = ServiceContext::new(Arc::clone(&device_service), Arc::clone(&entity_service));

    // Integration
    let hub = Arc::new(build_hub(&config)?);
    let mut nobo = NoboIntegration::new(hub, config.nobo.clone());
    nobo.setup(&ctx).await.context("Nobø integration setup failed")?;
    nobo.start_background(ctx)
        .await
        .context("failed to start Nobø update task")?;
    let nobo = Arc::new(nobo);

    // HTTP
    let state = AppState::from_arcs(entity_service, device_service, Arc::clone(&nobo));
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "ecohubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    match Arc::try_unwrap(nobo) {
        Ok(mut nobo) => nobo.teardown().await?,
        Err(_) => tracing::warn!("integration still shared after shutdown, skipping teardown"),
    }
    Ok(())
}

/// The hub the integration talks to: a fixture file when configured,
/// otherwise the built-in demo house.
fn build_hub(config: &Config) -> anyhow::Result<SimulatedHub> {
    if let Ok(Some(address)) = config.nobo.hub_address() {
        tracing::warn!(%address, "no network client available, the hub address is ignored");
    }
    let Some(path) = &config.simulation.fixture else {
        tracing::info!(serial = config.hub_serial(), "using the demo hub");
        return Ok(SimulatedHub::demo(config.hub_serial()));
    };
    let fixture = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read hub fixture {}", path.display()))?;
    let hub = SimulatedHub::from_toml_str(&fixture)
        .with_context(|| format!("invalid hub fixture {}", path.display()))?;
    tracing::info!(fixture = %path.display(), "using a fixture hub");
    Ok(hub)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

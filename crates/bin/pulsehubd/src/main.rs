//! # pulsehubd — pulsehub daemon
//!
//! Composition root that wires the Automate integration to the host.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the tracing subscriber
//! - Construct the in-memory repositories and the event bus
//! - Construct application services, injecting repositories via port traits
//! - Set up the Automate integration against the simulated hub
//! - Log every published event until Ctrl-C, then tear the integration down
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use pulsehub_adapter_automate::AutomateIntegration;
use pulsehub_adapter_automate::simulated::SimulatedHub;
use pulsehub_adapter_storage_memory::{InMemoryDeviceRepository, InMemoryEntityRepository};
use pulsehub_app::dispatcher::Dispatcher;
use pulsehub_app::entry_store::EntryStore;
use pulsehub_app::event_bus::InProcessEventBus;
use pulsehub_app::ports::Integration;
use pulsehub_app::services::device_service::DeviceService;
use pulsehub_app::services::entity_service::EntityService;
use pulsehub_app::services::integration_context::ServiceContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Repositories
    let entity_repo = InMemoryEntityRepository::new();
    let device_repo = InMemoryDeviceRepository::new();

    // Event bus
    let event_bus = InProcessEventBus::new(config.event_bus.capacity);
    let event_logger = tokio::spawn(log_events(event_bus.subscribe()));

    // Services
    let entity_service = Arc::new(EntityService::new(entity_repo, event_bus.clone()));
    let device_service = Arc::new(DeviceService::new(device_repo));
    let ctx = ServiceContext::new(
        Arc::clone(&device_service),
        Arc::clone(&entity_service),
        event_bus,
    );

    if config.automate.enabled {
        let client = Arc::new(SimulatedHub::new(
            config.automate.rollers.clone(),
            Duration::from_millis(config.automate.travel_millis),
        ));
        let mut integration = AutomateIntegration::new(
            &config.automate,
            client,
            Arc::new(EntryStore::new()),
            Arc::new(Dispatcher::new(config.automate.signal_capacity)),
        );

        integration
            .setup(&ctx)
            .await
            .context("failed to set up the automate integration")?;
        integration.start_background(ctx.clone()).await?;

        let entities = entity_service.list_entities().await?;
        tracing::info!(
            integration = integration.name(),
            entities = entities.len(),
            "pulsehubd running"
        );

        tokio::signal::ctrl_c().await?;
        tracing::info!("shutting down");
        integration.teardown().await?;
    } else {
        tracing::info!("automate integration disabled, nothing to run");
        tokio::signal::ctrl_c().await?;
    }

    event_logger.abort();
    Ok(())
}

async fn log_events(mut events: tokio::sync::broadcast::Receiver<pulsehub_domain::event::Event>) {
    loop {
        match events.recv().await {
            Ok(event) => tracing::info!(
                event_type = %event.event_type,
                entity = ?event.entity_id,
                data = %event.data,
                "event"
            ),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

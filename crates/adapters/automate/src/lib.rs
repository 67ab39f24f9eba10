//! # pulsehub-adapter-automate
//!
//! Automate Pulse Hub v2 integration. Exposes every roller blind managed
//! by the hub as a cover entity plus a battery sensor.
//!
//! ## How it works
//!
//! A config entry owns one [`PulseHub`] connection, registered in the
//! host's [`EntryStore`] under the entry id. The hub forwards every client
//! notification as the `automate_hub_update_<entry_id>` signal; the
//! platforms listen to it to add rollers that appear later and to refresh
//! the state of those already known.
//!
//! The hub reports positions as percent *closed*; covers report percent
//! *open*. Only positions are supported, rollers never report tilt.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `pulsehub-app` and `pulsehub-domain`.

mod client;
mod config;
pub mod cover;
mod entry;
mod error;
pub mod hub;
pub mod platform;
mod roller;
pub mod sensor;
pub mod simulated;

pub use client::{HubClient, HubUpdate};
pub use config::AutomateConfig;
pub use entry::{setup_entry, unload_entry};
pub use error::AutomateError;
pub use hub::PulseHub;
pub use roller::{MovingAction, Roller};

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use pulsehub_app::dispatcher::Dispatcher;
use pulsehub_app::entry_store::EntryStore;
use pulsehub_app::ports::{Integration, IntegrationContext};
use pulsehub_domain::config_entry::{ConfigEntry, ConfigEntryState};
use pulsehub_domain::entity::Entity;
use pulsehub_domain::error::{NotFoundError, PulseHubError};
use pulsehub_domain::id::{EntityId, EntryId};
use pulsehub_domain::service::{CoverService, ServiceCallError};

use crate::platform::{AutomateEntity, Platforms};

/// Integration domain, used for device registration and entity ids.
pub const DOMAIN: &str = "automate";

/// Integration for one Automate Pulse Hub.
pub struct AutomateIntegration<C: HubClient> {
    entry: ConfigEntry,
    client: Arc<C>,
    store: Arc<EntryStore<PulseHub<C>>>,
    dispatcher: Arc<Dispatcher>,
    platforms: Platforms<C>,
}

impl<C: HubClient> AutomateIntegration<C> {
    /// Create the integration and its config entry.
    ///
    /// Hubs are registered in `store`; signals go through `dispatcher`.
    #[must_use]
    pub fn new(
        config: &AutomateConfig,
        client: Arc<C>,
        store: Arc<EntryStore<PulseHub<C>>>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            entry: ConfigEntry::new(DOMAIN, config.title.clone()),
            client,
            store,
            dispatcher,
            platforms: Platforms::new(),
        }
    }

    /// Config entry tracked by this integration, with its current state.
    #[must_use]
    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    fn loaded_hub(&self) -> Result<Arc<PulseHub<C>>, PulseHubError> {
        self.store.get(self.entry.entry_id).ok_or_else(|| {
            NotFoundError {
                entity: EntryId::KIND,
                id: self.entry.entry_id.to_string(),
            }
            .into()
        })
    }
}

impl<C: HubClient> Integration for AutomateIntegration<C> {
    fn name(&self) -> &'static str {
        DOMAIN
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), PulseHubError> {
        if !self.entry.state.can_setup() {
            tracing::debug!(entry = %self.entry.entry_id, "entry already loaded");
            return Ok(());
        }

        let hub = Arc::new(PulseHub::new(
            self.entry.entry_id,
            Arc::clone(&self.client),
            Arc::clone(&self.dispatcher),
        ));
        if setup_entry(&self.entry, hub, &self.store, &self.platforms, ctx).await {
            self.entry.state = ConfigEntryState::Loaded;
            Ok(())
        } else {
            self.entry.state = ConfigEntryState::SetupError;
            tracing::warn!(entry = %self.entry.entry_id, "automate setup failed");
            Err(AutomateError::SetupFailed.into())
        }
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), PulseHubError> {
        let hub = self.loaded_hub()?;
        let mut signals = self.dispatcher.connect(&hub.signal());
        let platforms = self.platforms.clone();
        let client = Arc::clone(&self.client);

        let handle = tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        if let Err(err) = platforms.sync(&client, &ctx).await {
                            tracing::warn!(error = %err, "failed to refresh rollers");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        hub.push_cleanup(handle);

        tracing::info!(entry = %self.entry.entry_id, "automate update listener started");
        Ok(())
    }

    fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.platforms.owns(entity_id)
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, PulseHubError> {
        let entity = self
            .platforms
            .entity(entity_id)
            .ok_or_else(|| NotFoundError {
                entity: EntityId::KIND,
                id: entity_id.to_string(),
            })?;
        let command = CoverService::parse(service, &data)?;

        let AutomateEntity::Cover(cover) = entity.as_ref() else {
            return Err(ServiceCallError::NotSupported {
                service: command.name(),
            }
            .into());
        };
        let command = command.ensure_supported(cover.supported_features())?;

        tracing::debug!(entity = %entity_id, service = command.name(), "service call");
        cover.handle(command).await?;
        cover.to_entity()
    }

    async fn teardown(&mut self) -> Result<(), PulseHubError> {
        if !self.entry.is_loaded() {
            return Ok(());
        }
        if unload_entry(self.entry.entry_id, &self.store, &self.platforms).await {
            self.entry.state = ConfigEntryState::NotLoaded;
            tracing::info!("automate integration stopped");
            Ok(())
        } else {
            self.entry.state = ConfigEntryState::FailedUnload;
            tracing::warn!(entry = %self.entry.entry_id, "automate unload failed");
            Err(AutomateError::UnloadFailed.into())
        }
    }
}

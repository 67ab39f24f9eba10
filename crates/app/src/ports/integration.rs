//! Integration port — lifecycle and service-call handling for device integrations.
//!
//! An integration bridges an external system (a vendor hub, a simulated
//! hub, …) into pulsehub. It registers devices/entities through an
//! [`IntegrationContext`] and handles service calls directed at entities it
//! owns.

use std::future::Future;

use pulsehub_domain::device::Device;
use pulsehub_domain::entity::Entity;
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::event::Event;
use pulsehub_domain::id::EntityId;

/// Context provided to integrations for persisting discoveries.
///
/// This is a **port** — adapters call it to persist devices and entities
/// they discover. The binary crate provides a concrete implementation
/// backed by `DeviceService` and `EntityService`.
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, PulseHubError>> + Send;

    /// Persist an entity snapshot (create or update by `entity_id` string).
    ///
    /// Publishes `EntityCreated` / `StateChanged` events when appropriate.
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, PulseHubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), PulseHubError>> + Send;
}

/// A pluggable device integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup) — connect and persist what is already known
/// 2. [`start_background`](Self::start_background) — spawn long-running tasks
/// 3. (service calls are forwarded via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown) — clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"automate"`).
    fn name(&self) -> &'static str;

    /// Connect and persist the devices/entities known at this point.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), PulseHubError>> + Send;

    /// Start long-running background work (update subscriptions, …).
    ///
    /// Spawns internal tasks that persist changes via `ctx` and returns
    /// immediately. The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), PulseHubError>> + Send {
        async { Ok(()) }
    }

    /// Whether `entity_id` belongs to this integration.
    fn owns_entity(&self, entity_id: EntityId) -> bool;

    /// Handle a service call (e.g. `open_cover`, `set_cover_position`) for an
    /// entity owned by this integration.
    ///
    /// Returns the entity snapshot after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, PulseHubError>> + Send;

    /// Called on graceful shutdown. Clean up any background tasks or connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), PulseHubError>> + Send;
}

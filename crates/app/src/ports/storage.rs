//! Storage port — repository traits for persistence.

use std::future::Future;

use pulsehub_domain::device::Device;
use pulsehub_domain::entity::Entity;
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::id::{DeviceId, EntityId};

/// Repository for [`Entity`] records.
pub trait EntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, PulseHubError>> + Send;

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, PulseHubError>> + Send;

    /// Look up an entity by its `<domain>.<object_id>` string.
    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, PulseHubError>> + Send;

    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, PulseHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, PulseHubError>> + Send;

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, PulseHubError>> + Send;

    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), PulseHubError>> + Send;
}

/// Repository for [`Device`] records.
pub trait DeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, PulseHubError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, PulseHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, PulseHubError>> + Send;

    /// Look up a device by the identity its integration gave it.
    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, PulseHubError>> + Send;

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, PulseHubError>> + Send;

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), PulseHubError>> + Send;
}

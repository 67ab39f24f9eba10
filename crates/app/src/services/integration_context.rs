//! Concrete [`IntegrationContext`] backed by application services.

use std::sync::Arc;

use pulsehub_domain::device::Device;
use pulsehub_domain::entity::Entity;
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::event::Event;

use crate::ports::{DeviceRepository, EntityRepository, EventPublisher, IntegrationContext};
use crate::services::device_service::DeviceService;
use crate::services::entity_service::EntityService;

/// Hands integrations a write path into the host: devices go through
/// [`DeviceService`], entity snapshots through [`EntityService`] (which
/// publishes state changes), raw events straight to the publisher.
///
/// Cloning shares the services; background tasks of an integration each
/// hold their own clone. Integrations only see the [`IntegrationContext`]
/// trait, never the generic parameters.
pub struct ServiceContext<DR, ER, EP> {
    device_service: Arc<DeviceService<DR>>,
    entity_service: Arc<EntityService<ER, EP>>,
    event_publisher: EP,
}

impl<DR, ER, EP> ServiceContext<DR, ER, EP> {
    /// Context over the given services.
    pub fn new(
        device_service: Arc<DeviceService<DR>>,
        entity_service: Arc<EntityService<ER, EP>>,
        event_publisher: EP,
    ) -> Self {
        Self {
            device_service,
            entity_service,
            event_publisher,
        }
    }

    /// The entity service integrations write through, for read-side callers.
    #[must_use]
    pub fn entity_service(&self) -> &EntityService<ER, EP> {
        &self.entity_service
    }

    #[must_use]
    pub fn device_service(&self) -> &DeviceService<DR> {
        &self.device_service
    }
}

impl<DR, ER, EP: Clone> Clone for ServiceContext<DR, ER, EP> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            entity_service: Arc::clone(&self.entity_service),
            event_publisher: self.event_publisher.clone(),
        }
    }
}

impl<DR, ER, EP> IntegrationContext for ServiceContext<DR, ER, EP>
where
    DR: DeviceRepository + Send + Sync + 'static,
    ER: EntityRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    async fn upsert_device(&self, device: Device) -> Result<Device, PulseHubError> {
        self.device_service.upsert_device(device).await
    }

    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, PulseHubError> {
        self.entity_service.upsert_entity(entity).await
    }

    async fn publish(&self, event: Event) -> Result<(), PulseHubError> {
        self.event_publisher.publish(event).await
    }
}

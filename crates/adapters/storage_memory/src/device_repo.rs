//! In-memory implementation of [`DeviceRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pulsehub_app::ports::DeviceRepository;
use pulsehub_domain::device::Device;
use pulsehub_domain::error::{NotFoundError, PulseHubError};
use pulsehub_domain::id::DeviceId;

use crate::error::StorageError;

/// Device repository backed by a shared map; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryDeviceRepository {
    store: Arc<RwLock<HashMap<DeviceId, Device>>>,
}

impl InMemoryDeviceRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DeviceId, Device>> {
        self.store
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DeviceId, Device>> {
        self.store
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn insert(&self, device: Device) -> Result<Device, PulseHubError> {
        let mut store = self.write();
        let taken = store.values().any(|other| {
            other.integration == device.integration
                && other.unique_id == device.unique_id
                && other.id != device.id
        });
        if taken {
            return Err(StorageError::DuplicateDevice {
                integration: device.integration,
                unique_id: device.unique_id,
            }
            .into());
        }
        store.insert(device.id, device.clone());
        Ok(device)
    }
}

impl DeviceRepository for InMemoryDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, PulseHubError>> + Send {
        let result = self.insert(device);
        async { result }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, PulseHubError>> + Send {
        let result = self.read().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, PulseHubError>> + Send {
        let mut result: Vec<Device> = self.read().values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, PulseHubError>> + Send {
        let result = self
            .read()
            .values()
            .find(|d| d.integration == integration && d.unique_id == unique_id)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, PulseHubError>> + Send {
        let result = if self.read().contains_key(&device.id) {
            self.insert(device)
        } else {
            Err(NotFoundError {
                entity: DeviceId::KIND,
                id: device.id.to_string(),
            }
            .into())
        };
        async { result }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), PulseHubError>> + Send {
        if self.write().remove(&id).is_some() {
            tracing::debug!(device = %id, "device removed");
        }
        async { Ok(()) }
    }
}

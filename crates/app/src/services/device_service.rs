//! Device service — use-cases for managing devices.

use pulsehub_domain::device::Device;
use pulsehub_domain::error::{NotFoundError, PulseHubError};
use pulsehub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for device registration and lookup.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn create_device(&self, device: Device) -> Result<Device, PulseHubError> {
        device.validate()?;
        self.repo.create(device).await
    }

    /// # Errors
    ///
    /// Returns [`PulseHubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, PulseHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: DeviceId::KIND,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, PulseHubError> {
        self.repo.get_all().await
    }

    /// Create or update a device by its `(integration, unique_id)` pair.
    ///
    /// An existing device keeps its id; its name and hardware metadata are
    /// replaced by the newly reported values.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name, unique_id = %device.unique_id))]
    pub async fn upsert_device(&self, device: Device) -> Result<Device, PulseHubError> {
        device.validate()?;
        match self
            .repo
            .find_by_integration_unique_id(&device.integration, &device.unique_id)
            .await?
        {
            Some(existing) if existing == Device { id: existing.id, ..device.clone() } => {
                Ok(existing)
            }
            Some(existing) => {
                tracing::debug!("updating known device");
                self.repo
                    .update(Device {
                        id: existing.id,
                        ..device
                    })
                    .await
            }
            None => {
                tracing::debug!("registering new device");
                self.repo.create(device).await
            }
        }
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), PulseHubError> {
        self.repo.delete(id).await
    }
}

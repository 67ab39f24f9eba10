//! Device — a physical thing that exposes one or more entities.
//!
//! Devices are identified across restarts by the pair
//! `(integration, unique_id)`; the [`DeviceId`] is only stable once stored.

use serde::{Deserialize, Serialize};

use crate::error::{PulseHubError, ValidationError};
use crate::id::DeviceId;

/// A device registered by an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sw_version: Option<String>,
    /// Name of the integration that provided this device.
    pub integration: String,
    /// Identifier of the device within its integration.
    pub unique_id: String,
}

impl Device {
    /// Start building a device; `name`, `integration` and `unique_id` are required.
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check the device invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty name, integration or unique id.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.integration.is_empty() {
            return Err(ValidationError::EmptyIntegration);
        }
        if self.unique_id.is_empty() {
            return Err(ValidationError::EmptyUniqueId);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: String,
    manufacturer: Option<String>,
    model: Option<String>,
    sw_version: Option<String>,
    integration: String,
    unique_id: String,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn sw_version(mut self, sw_version: impl Into<String>) -> Self {
        self.sw_version = Some(sw_version.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = integration.into();
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] when the device invariants fail.
    pub fn build(self) -> Result<Device, PulseHubError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name,
            manufacturer: self.manufacturer,
            model: self.model,
            sw_version: self.sw_version,
            integration: self.integration,
            unique_id: self.unique_id,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_device_with_optional_metadata() {
        let device = Device::builder()
            .name("Lounge Blind")
            .manufacturer("Automate")
            .model("7")
            .sw_version("1.2.3")
            .integration("automate")
            .unique_id("ABC")
            .build()
            .unwrap();
        assert_eq!(device.name, "Lounge Blind");
        assert_eq!(device.model.as_deref(), Some("7"));
        assert_eq!(device.sw_version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn should_reject_empty_name() {
        let result = Device::builder()
            .integration("automate")
            .unique_id("ABC")
            .build();
        assert!(matches!(
            result,
            Err(PulseHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_missing_integration() {
        let result = Device::builder().name("Blind").unique_id("ABC").build();
        assert!(matches!(
            result,
            Err(PulseHubError::Validation(ValidationError::EmptyIntegration))
        ));
    }

    #[test]
    fn should_reject_missing_unique_id() {
        let result = Device::builder().name("Blind").integration("automate").build();
        assert!(matches!(
            result,
            Err(PulseHubError::Validation(ValidationError::EmptyUniqueId))
        ));
    }
}

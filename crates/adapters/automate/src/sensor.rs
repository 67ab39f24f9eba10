//! Sensor platform entity: the roller battery.

use std::sync::Arc;

use pulsehub_domain::entity::{Entity, EntityState, attr};
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::id::EntityId;

use crate::client::HubClient;
use crate::platform::slugify;

/// Battery reading of one roller, exposed as a `sensor` entity.
pub struct BatterySensor<C> {
    id: EntityId,
    roller_id: String,
    name: String,
    client: Arc<C>,
}

impl<C: HubClient> BatterySensor<C> {
    /// Sensor for `roller`, reading the battery through `client`.
    #[must_use]
    pub fn new(id: EntityId, roller: &crate::Roller, client: Arc<C>) -> Self {
        Self {
            id,
            roller_id: roller.id.clone(),
            name: roller.display_name().to_string(),
            client,
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Entity id of the form `sensor.automate_<roller>_battery`.
    #[must_use]
    pub fn entity_id(&self) -> String {
        format!("sensor.{}_{}_battery", crate::DOMAIN, slugify(&self.roller_id))
    }

    /// Snapshot the battery as an entity.
    ///
    /// The state stays `unknown` while the roller is reported; the level,
    /// unit and voltage are attributes present once the hub has a reading.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if the snapshot is not a valid entity.
    pub fn to_entity(&self) -> Result<Entity, PulseHubError> {
        let roller = self.client.roller(&self.roller_id);
        let name = roller
            .as_ref()
            .map_or(self.name.as_str(), |roller| roller.display_name());

        let mut builder = Entity::builder()
            .id(self.id)
            .entity_id(self.entity_id())
            .friendly_name(format!("{name} Battery"))
            .state(if roller.is_some() {
                EntityState::Unknown
            } else {
                EntityState::Unavailable
            })
            .attribute(attr::DEVICE_CLASS, "battery".into());

        // the reading lives in the attributes
        if let Some((level, volts)) = roller
            .as_ref()
            .and_then(|r| r.battery_percent.map(|p| (p, r.battery)))
        {
            builder = builder
                .attribute(attr::BATTERY_LEVEL, level.into())
                .attribute(attr::UNIT_OF_MEASUREMENT, "%".into())
                .attribute(attr::VOLTAGE, volts.into());
        }
        builder.build()
    }
}

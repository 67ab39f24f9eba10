//! Cover platform entity.
//!
//! The hub reports how far a roller is *closed*; covers report how far
//! they are *open*. [`CoverView`] does that translation over a borrowed
//! roller snapshot, [`AutomateCover`] binds it to an entity and forwards
//! commands to the client.

use std::collections::HashMap;
use std::sync::Arc;

use pulsehub_domain::cover::{self, SupportedFeatures, cover_state};
use pulsehub_domain::entity::{self, AttributeValue, Entity, EntityState};
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::id::EntityId;
use pulsehub_domain::service::CoverService;

use crate::client::HubClient;
use crate::error::AutomateError;
use crate::platform::slugify;
use crate::roller::{MovingAction, Roller};

/// Converts between open and closed percentages; the conversion is its own inverse.
fn invert(percent: u8) -> u8 {
    100u8.saturating_sub(percent)
}

/// Read-only cover properties of a roller snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CoverView<'a> {
    roller: &'a Roller,
}

impl<'a> CoverView<'a> {
    /// View over a single roller snapshot.
    #[must_use]
    pub fn new(roller: &'a Roller) -> Self {
        Self { roller }
    }

    /// Open percentage, `None` while the hub has not reported one.
    #[must_use]
    pub fn current_cover_position(&self) -> Option<u8> {
        let position = self.roller.closed_percent.map(invert);
        tracing::trace!(roller = %self.roller.id, ?position, "cover position read");
        position
    }

    /// Rollers never report tilt.
    #[must_use]
    pub fn current_cover_tilt_position(&self) -> Option<u8> {
        tracing::trace!(roller = %self.roller.id, "cover tilt position read");
        None
    }

    /// Position support follows whether a position is known; tilt is never advertised.
    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        let mut features = SupportedFeatures::empty();
        if self.current_cover_position().is_some() {
            features |= SupportedFeatures::POSITION;
        }
        if self.current_cover_tilt_position().is_some() {
            features |= SupportedFeatures::TILT;
        }
        features
    }

    /// Whether the roller is travelling up.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.roller.action == MovingAction::Up
    }

    /// Whether the roller is travelling down.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.roller.action == MovingAction::Down
    }

    /// Only a fully closed roller counts as closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.roller.closed_percent == Some(100)
    }

    /// Cover state; motion wins over the closed flag.
    #[must_use]
    pub fn state(&self) -> EntityState {
        cover_state(self.is_opening(), self.is_closing(), self.is_closed())
    }

    /// Attributes the roller itself contributes.
    #[must_use]
    pub fn state_attributes(&self) -> HashMap<String, AttributeValue> {
        let mut attrs: HashMap<String, AttributeValue> = HashMap::from([
            (entity::attr::ID.to_string(), self.roller.id.as_str().into()),
            (
                entity::attr::NAME.to_string(),
                self.roller.display_name().into(),
            ),
        ]);
        if let Some(level) = self.roller.battery_percent {
            attrs.insert(entity::attr::BATTERY_LEVEL.to_string(), level.into());
            attrs.insert(
                entity::attr::VOLTAGE.to_string(),
                self.roller.battery.into(),
            );
        }
        attrs
    }

    /// Every attribute of the cover entity, including the cover-domain ones.
    #[must_use]
    pub fn attributes(&self) -> HashMap<String, AttributeValue> {
        let mut attrs = self.state_attributes();
        if let Some(position) = self.current_cover_position() {
            attrs.insert(cover::attr::CURRENT_POSITION.to_string(), position.into());
        }
        if let Some(tilt) = self.current_cover_tilt_position() {
            attrs.insert(cover::attr::CURRENT_TILT_POSITION.to_string(), tilt.into());
        }
        attrs.insert(
            cover::attr::SUPPORTED_FEATURES.to_string(),
            self.supported_features().bits().into(),
        );
        attrs
    }
}

/// A roller exposed as a cover entity.
pub struct AutomateCover<C> {
    id: EntityId,
    roller_id: String,
    name: String,
    client: Arc<C>,
}

impl<C: HubClient> AutomateCover<C> {
    /// Cover for `roller` with the given entity id, commanding it through `client`.
    #[must_use]
    pub fn new(id: EntityId, roller: &Roller, client: Arc<C>) -> Self {
        Self {
            id,
            roller_id: roller.id.clone(),
            name: roller.display_name().to_string(),
            client,
        }
    }

    /// Registry id of the entity.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Hub-side id of the roller.
    #[must_use]
    pub fn roller_id(&self) -> &str {
        &self.roller_id
    }

    /// Entity id of the form `cover.automate_<roller>`.
    #[must_use]
    pub fn entity_id(&self) -> String {
        format!("cover.{}_{}", crate::DOMAIN, slugify(&self.roller_id))
    }

    /// Features of the current roller snapshot; nothing when the roller is gone.
    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        self.client
            .roller(&self.roller_id)
            .map_or(SupportedFeatures::empty(), |roller| {
                CoverView::new(&roller).supported_features()
            })
    }

    /// Snapshot the roller as an entity.
    ///
    /// A roller the hub no longer reports becomes `unavailable`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if the snapshot is not a valid entity.
    pub fn to_entity(&self) -> Result<Entity, PulseHubError> {
        let builder = Entity::builder().id(self.id).entity_id(self.entity_id());
        match self.client.roller(&self.roller_id) {
            Some(roller) => {
                let view = CoverView::new(&roller);
                builder
                    .friendly_name(roller.display_name())
                    .state(view.state())
                    .attributes(view.attributes())
                    .build()
            }
            None => builder
                .friendly_name(&self.name)
                .state(EntityState::Unavailable)
                .build(),
        }
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the move.
    pub async fn open_cover(&self) -> Result<(), AutomateError> {
        tracing::debug!(roller = %self.roller_id, "opening cover");
        self.client
            .move_up(&self.roller_id)
            .await
            .map_err(AutomateError::client)
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the move.
    pub async fn close_cover(&self) -> Result<(), AutomateError> {
        tracing::debug!(roller = %self.roller_id, "closing cover");
        self.client
            .move_down(&self.roller_id)
            .await
            .map_err(AutomateError::client)
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the stop.
    pub async fn stop_cover(&self) -> Result<(), AutomateError> {
        tracing::debug!(roller = %self.roller_id, "stopping cover");
        self.client
            .move_stop(&self.roller_id)
            .await
            .map_err(AutomateError::client)
    }

    /// Move to `position` percent open.
    ///
    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the move.
    pub async fn set_cover_position(&self, position: u8) -> Result<(), AutomateError> {
        tracing::debug!(roller = %self.roller_id, position, "moving cover");
        self.client
            .move_to(&self.roller_id, invert(position))
            .await
            .map_err(AutomateError::client)
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the move.
    pub async fn open_cover_tilt(&self) -> Result<(), AutomateError> {
        self.open_cover().await
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the move.
    pub async fn close_cover_tilt(&self) -> Result<(), AutomateError> {
        self.close_cover().await
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the stop.
    pub async fn stop_cover_tilt(&self) -> Result<(), AutomateError> {
        self.stop_cover().await
    }

    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the move.
    pub async fn set_cover_tilt_position(&self, tilt: u8) -> Result<(), AutomateError> {
        self.set_cover_position(tilt).await
    }

    /// Run a parsed cover command.
    ///
    /// # Errors
    ///
    /// Returns [`AutomateError::Client`] when the hub rejects the command.
    pub async fn handle(&self, service: CoverService) -> Result<(), AutomateError> {
        match service {
            CoverService::Open => self.open_cover().await,
            CoverService::Close => self.close_cover().await,
            CoverService::Stop => self.stop_cover().await,
            CoverService::SetPosition(position) => self.set_cover_position(position).await,
            CoverService::OpenTilt => self.open_cover_tilt().await,
            CoverService::CloseTilt => self.close_cover_tilt().await,
            CoverService::StopTilt => self.stop_cover_tilt().await,
            CoverService::SetTiltPosition(tilt) => self.set_cover_tilt_position(tilt).await,
        }
    }
}

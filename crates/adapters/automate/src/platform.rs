//! Entity platforms and dynamic roller discovery.
//!
//! Each platform remembers which rollers it has already turned into
//! entities. A sync adds entities for rollers it has not seen yet and
//! refreshes the snapshot of every entity it already owns, so that state
//! changes reach the event bus through the host context.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pulsehub_app::ports::IntegrationContext;
use pulsehub_domain::device::Device;
use pulsehub_domain::entity::Entity;
use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::id::EntityId;

use crate::client::HubClient;
use crate::cover::AutomateCover;
use crate::roller::Roller;
use crate::sensor::BatterySensor;

/// Entity platforms a loaded entry forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Cover,
    Sensor,
}

pub const PLATFORMS: [Platform; 2] = [Platform::Cover, Platform::Sensor];

impl Platform {
    /// Entity domain of the platform's entities.
    #[must_use]
    pub fn domain(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Sensor => "sensor",
        }
    }

    fn build<C: HubClient>(self, id: EntityId, roller: &Roller, client: Arc<C>) -> AutomateEntity<C> {
        match self {
            Self::Cover => AutomateEntity::Cover(AutomateCover::new(id, roller, client)),
            Self::Sensor => AutomateEntity::Sensor(BatterySensor::new(id, roller, client)),
        }
    }
}

/// An entity created by one of the platforms.
pub enum AutomateEntity<C> {
    Cover(AutomateCover<C>),
    Sensor(BatterySensor<C>),
}

impl<C: HubClient> AutomateEntity<C> {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Cover(cover) => cover.id(),
            Self::Sensor(sensor) => sensor.id(),
        }
    }

    /// Platform that created the entity.
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::Cover(_) => Platform::Cover,
            Self::Sensor(_) => Platform::Sensor,
        }
    }

    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if the snapshot is not a valid entity.
    pub fn to_entity(&self) -> Result<Entity, PulseHubError> {
        match self {
            Self::Cover(cover) => cover.to_entity(),
            Self::Sensor(sensor) => sensor.to_entity(),
        }
    }
}

/// Lowercase `value`, replacing every non-alphanumeric character with `_`.
pub(crate) fn slugify(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Device record for a roller.
fn roller_device(roller: &Roller) -> Result<Device, PulseHubError> {
    let mut builder = Device::builder()
        .name(roller.display_name())
        .manufacturer("Automate")
        .model(roller.device_type.to_string())
        .integration(crate::DOMAIN)
        .unique_id(&roller.id);
    if !roller.version.is_empty() {
        builder = builder.sw_version(&roller.version);
    }
    builder.build()
}

struct PlatformState<C> {
    loaded: HashSet<Platform>,
    /// Roller ids each platform has added (or is adding).
    current: HashMap<Platform, HashSet<String>>,
    entities: HashMap<EntityId, Arc<AutomateEntity<C>>>,
}

/// Shared registry of the platforms' entities; clones see the same state.
pub struct Platforms<C> {
    state: Arc<RwLock<PlatformState<C>>>,
}

impl<C> Clone for Platforms<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<C> Default for Platforms<C> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(PlatformState {
                loaded: HashSet::new(),
                current: HashMap::new(),
                entities: HashMap::new(),
            })),
        }
    }
}

impl<C: HubClient> Platforms<C> {
    /// Registry with no platform loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `platform` and add entities for every roller the hub reports.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while persisting an entity.
    pub async fn setup(
        &self,
        platform: Platform,
        client: &Arc<C>,
        ctx: &impl IntegrationContext,
    ) -> Result<usize, PulseHubError> {
        self.write().loaded.insert(platform);
        tracing::debug!(platform = platform.domain(), "platform loaded");
        self.sync_platform(platform, client, ctx).await
    }

    /// Forget `platform` and the entities it created.
    pub fn unload(&self, platform: Platform) -> bool {
        let mut guard = self.write();
        let state = &mut *guard;
        state.loaded.remove(&platform);
        state.current.remove(&platform);
        state.entities.retain(|_, entity| entity.platform() != platform);
        tracing::debug!(platform = platform.domain(), "platform unloaded");
        true
    }

    /// Sync every loaded platform, returning how many entities were added.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while persisting an entity.
    pub async fn sync(
        &self,
        client: &Arc<C>,
        ctx: &impl IntegrationContext,
    ) -> Result<usize, PulseHubError> {
        let mut added = 0;
        for platform in PLATFORMS {
            added += self.sync_platform(platform, client, ctx).await?;
        }
        Ok(added)
    }

    async fn sync_platform(
        &self,
        platform: Platform,
        client: &Arc<C>,
        ctx: &impl IntegrationContext,
    ) -> Result<usize, PulseHubError> {
        let rollers = client.rollers();
        let (new_rollers, known) = {
            let mut guard = self.write();
            let state = &mut *guard;
            if !state.loaded.contains(&platform) {
                return Ok(0);
            }
            let current = state.current.entry(platform).or_default();
            let new_rollers: Vec<Roller> = rollers
                .into_iter()
                .filter(|roller| current.insert(roller.id.clone()))
                .collect();
            let known: Vec<Arc<AutomateEntity<C>>> = state
                .entities
                .values()
                .filter(|entity| entity.platform() == platform)
                .cloned()
                .collect();
            (new_rollers, known)
        };

        let mut added = 0;
        let result: Result<(), PulseHubError> = async {
            for entity in known {
                ctx.upsert_entity(entity.to_entity()?).await?;
            }
            for roller in &new_rollers {
                self.add(platform, roller, client, ctx).await?;
                added += 1;
            }
            Ok(())
        }
        .await;

        if let Err(err) = result {
            self.release(platform, &new_rollers[added..]);
            return Err(err);
        }
        Ok(added)
    }

    /// Drop the reservation of rollers that were never added, so a later
    /// sync retries them.
    fn release(&self, platform: Platform, rollers: &[Roller]) {
        if let Some(current) = self.write().current.get_mut(&platform) {
            for roller in rollers {
                current.remove(&roller.id);
            }
        }
    }

    async fn add(
        &self,
        platform: Platform,
        roller: &Roller,
        client: &Arc<C>,
        ctx: &impl IntegrationContext,
    ) -> Result<(), PulseHubError> {
        let device = ctx.upsert_device(roller_device(roller)?).await?;
        let entity = platform.build(EntityId::new(), roller, Arc::clone(client));
        let mut snapshot = entity.to_entity()?;
        snapshot.device_id = Some(device.id);
        let stored = ctx.upsert_entity(snapshot).await?;

        // a snapshot stored by an earlier load keeps its id
        let entity = platform.build(stored.id, roller, Arc::clone(client));
        self.write().entities.insert(stored.id, Arc::new(entity));
        tracing::debug!(
            platform = platform.domain(),
            roller = %roller.id,
            entity_id = %stored.entity_id,
            "entity added"
        );
        Ok(())
    }

    /// Entity created by a loaded platform, if any.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<Arc<AutomateEntity<C>>> {
        self.read().entities.get(&id).cloned()
    }

    /// Whether `id` was created by a loaded platform.
    #[must_use]
    pub fn owns(&self, id: EntityId) -> bool {
        self.read().entities.contains_key(&id)
    }

    #[must_use]
    pub fn is_loaded(&self, platform: Platform) -> bool {
        self.read().loaded.contains(&platform)
    }

    /// Number of entities across loaded platforms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, PlatformState<C>> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PlatformState<C>> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

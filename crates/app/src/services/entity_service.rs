//! Entity service — use-cases for managing entities.
//!
//! Every mutation that changes what an observer would see is published on
//! the event bus: `entity_created` for new entities, `state_changed` when
//! the state or the attributes of an existing entity differ.

use pulsehub_domain::entity::{Entity, EntityState};
use pulsehub_domain::error::{NotFoundError, PulseHubError};
use pulsehub_domain::event::{Event, EventType};
use pulsehub_domain::id::{DeviceId, EntityId};
use pulsehub_domain::time::{now, now_after};

use crate::ports::{EntityRepository, EventPublisher};

/// Application service for entity CRUD and state management.
pub struct EntityService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: EntityRepository, P: EventPublisher> EntityService<R, P> {
    /// Create a new service backed by the given repository, publishing through `publisher`.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Create a new entity after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    pub async fn create_entity(&self, mut entity: Entity) -> Result<Entity, PulseHubError> {
        entity.validate()?;
        let ts = now();
        entity.last_updated = ts;
        entity.last_changed = ts;
        let created = self.repo.create(entity).await?;
        self.publisher
            .publish_all(vec![
                Event::new(
                    EventType::EntityCreated,
                    Some(created.id),
                    serde_json::json!({ "entity_id": created.entity_id }),
                ),
                Event::state_changed(None, &created),
            ])
            .await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns [`PulseHubError::NotFound`] when no entity with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, PulseHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: EntityId::KIND,
                id: id.to_string(),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns [`PulseHubError::NotFound`] when no entity has this
    /// `<domain>.<object_id>`, or a storage error from the repository.
    pub async fn get_entity_by_entity_id(&self, entity_id: &str) -> Result<Entity, PulseHubError> {
        self.repo.find_by_entity_id(entity_id).await?.ok_or_else(|| {
            NotFoundError {
                entity: EntityId::KIND,
                id: entity_id.to_string(),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, PulseHubError> {
        self.repo.get_all().await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_device_entities(
        &self,
        device_id: DeviceId,
    ) -> Result<Vec<Entity>, PulseHubError> {
        self.repo.find_by_device_id(device_id).await
    }

    /// Create or update an entity by its `entity_id` string.
    ///
    /// A known entity keeps its stored id and its `last_changed` unless the
    /// state moved. Nothing is written or published when the snapshot is
    /// identical to what is stored.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id, state = %entity.state))]
    pub async fn upsert_entity(&self, entity: Entity) -> Result<Entity, PulseHubError> {
        entity.validate()?;
        let Some(existing) = self.repo.find_by_entity_id(&entity.entity_id).await? else {
            return self.create_entity(entity).await;
        };

        // snapshots without a device keep the one already linked
        let device_id = entity.device_id.or(existing.device_id);
        let unchanged = existing.state == entity.state
            && existing.attributes == entity.attributes
            && existing.friendly_name == entity.friendly_name
            && existing.device_id == device_id;
        if unchanged {
            return Ok(existing);
        }

        let mut updated = existing.clone();
        updated.friendly_name = entity.friendly_name;
        updated.device_id = device_id;
        updated.attributes = entity.attributes;
        updated.update_state(entity.state, now_after(existing.last_updated));

        let updated = self.repo.update(updated).await?;
        self.publisher
            .publish(Event::state_changed(Some(&existing), &updated))
            .await?;
        Ok(updated)
    }

    /// Update the state of an existing entity.
    ///
    /// # Errors
    ///
    /// Returns [`PulseHubError::NotFound`] if the entity does not exist,
    /// or a storage error from the repository.
    pub async fn update_entity_state(
        &self,
        id: EntityId,
        new_state: EntityState,
    ) -> Result<Entity, PulseHubError> {
        let existing = self.get_entity(id).await?;
        let mut entity = existing.clone();
        entity.update_state(new_state, now_after(existing.last_updated));
        let entity = self.repo.update(entity).await?;
        if existing.state != entity.state {
            self.publisher
                .publish(Event::state_changed(Some(&existing), &entity))
                .await?;
        }
        Ok(entity)
    }

    /// Delete an entity by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn delete_entity(&self, id: EntityId) -> Result<(), PulseHubError> {
        self.repo.delete(id).await?;
        self.publisher
            .publish(Event::new(
                EventType::EntityRemoved,
                Some(id),
                serde_json::Value::Null,
            ))
            .await
    }
}

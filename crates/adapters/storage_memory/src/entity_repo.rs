//! In-memory implementation of [`EntityRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pulsehub_app::ports::EntityRepository;
use pulsehub_domain::entity::Entity;
use pulsehub_domain::error::{NotFoundError, PulseHubError};
use pulsehub_domain::id::{DeviceId, EntityId};

use crate::error::StorageError;

/// Entity repository backed by a shared map; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryEntityRepository {
    store: Arc<RwLock<HashMap<EntityId, Entity>>>,
}

impl InMemoryEntityRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<EntityId, Entity>> {
        self.store
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EntityId, Entity>> {
        self.store
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn insert(&self, entity: Entity) -> Result<Entity, PulseHubError> {
        let mut store = self.write();
        let taken = store
            .values()
            .any(|other| other.entity_id == entity.entity_id && other.id != entity.id);
        if taken {
            return Err(StorageError::DuplicateEntityId(entity.entity_id).into());
        }
        store.insert(entity.id, entity.clone());
        Ok(entity)
    }
}

impl EntityRepository for InMemoryEntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, PulseHubError>> + Send {
        let result = self.insert(entity);
        async { result }
    }

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, PulseHubError>> + Send {
        let result = self.read().get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, PulseHubError>> + Send {
        let result = self
            .read()
            .values()
            .find(|e| e.entity_id == entity_id)
            .cloned();
        async { Ok(result) }
    }

    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, PulseHubError>> + Send {
        let mut result: Vec<Entity> = self
            .read()
            .values()
            .filter(|e| e.device_id == Some(device_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, PulseHubError>> + Send {
        let mut result: Vec<Entity> = self.read().values().cloned().collect();
        result.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        async { Ok(result) }
    }

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, PulseHubError>> + Send {
        let result = if self.read().contains_key(&entity.id) {
            self.insert(entity)
        } else {
            Err(NotFoundError {
                entity: EntityId::KIND,
                id: entity.id.to_string(),
            }
            .into())
        };
        async { result }
    }

    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), PulseHubError>> + Send {
        if self.write().remove(&id).is_some() {
            tracing::debug!(entity = %id, "entity removed");
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsehub_domain::entity::EntityState;

    fn cover(entity_id: &str) -> Entity {
        Entity::builder()
            .entity_id(entity_id)
            .friendly_name("Blind")
            .state(EntityState::Open)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_store_and_find_entity_by_both_ids() {
        let repo = InMemoryEntityRepository::new();
        let entity = cover("cover.automate_abc");
        let id = entity.id;
        repo.create(entity).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().is_some());
        let found = repo.find_by_entity_id("cover.automate_abc").await.unwrap();
        assert_eq!(found.map(|e| e.id), Some(id));
    }

    #[tokio::test]
    async fn should_reject_duplicate_entity_id_string() {
        let repo = InMemoryEntityRepository::new();
        repo.create(cover("cover.automate_abc")).await.unwrap();

        let result = repo.create(cover("cover.automate_abc")).await;
        assert!(matches!(result, Err(PulseHubError::Storage(_))));
    }

    #[tokio::test]
    async fn should_share_data_between_clones() {
        let repo = InMemoryEntityRepository::new();
        let clone = repo.clone();
        repo.create(cover("cover.automate_abc")).await.unwrap();

        assert_eq!(clone.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_entity() {
        let repo = InMemoryEntityRepository::new();
        let result = repo.update(cover("cover.automate_abc")).await;
        assert!(matches!(result, Err(PulseHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_update_existing_entity_in_place() {
        let repo = InMemoryEntityRepository::new();
        let mut entity = repo.create(cover("cover.automate_abc")).await.unwrap();
        entity.state = EntityState::Closed;

        repo.update(entity.clone()).await.unwrap();
        let stored = repo.get_by_id(entity.id).await.unwrap().unwrap();
        assert_eq!(stored.state, EntityState::Closed);
    }

    #[tokio::test]
    async fn should_list_entities_sorted_by_entity_id() {
        let repo = InMemoryEntityRepository::new();
        repo.create(cover("sensor.automate_b_battery")).await.unwrap();
        repo.create(cover("cover.automate_b")).await.unwrap();

        let ids: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(ids, ["cover.automate_b", "sensor.automate_b_battery"]);
    }

    #[tokio::test]
    async fn should_filter_by_device() {
        let repo = InMemoryEntityRepository::new();
        let device_id = DeviceId::new();
        let mut owned = cover("cover.automate_abc");
        owned.device_id = Some(device_id);
        repo.create(owned).await.unwrap();
        repo.create(cover("cover.automate_def")).await.unwrap();

        let found = repo.find_by_device_id(device_id).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity_id, "cover.automate_abc");
    }

    #[tokio::test]
    async fn should_delete_entity() {
        let repo = InMemoryEntityRepository::new();
        let entity = repo.create(cover("cover.automate_abc")).await.unwrap();

        repo.delete(entity.id).await.unwrap();
        assert!(repo.get_by_id(entity.id).await.unwrap().is_none());
    }
}

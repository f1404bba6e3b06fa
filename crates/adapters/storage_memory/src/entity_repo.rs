//! In-memory implementation of [`EntityRepository`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use ecohub_app::ports::EntityRepository;
use ecohub_domain::entity::Entity;
use ecohub_domain::error::{EcoHubError, NotFoundError};
use ecohub_domain::id::{DeviceId, EntityId};

use crate::{read, write};

/// Entity snapshots keyed by id. Cloning shares the same store.
#[derive(Clone, Default)]
pub struct MemoryEntityRepository {
    entities: Arc<RwLock<HashMap<EntityId, Entity>>>,
}

impl MemoryEntityRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut entities: Vec<Entity>) -> Vec<Entity> {
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }
}

impl EntityRepository for MemoryEntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, EcoHubError>> + Send {
        write(&self.entities).insert(entity.id, entity.clone());
        tracing::trace!(entity_id = %entity.entity_id, "entity stored");
        async { Ok(entity) }
    }

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, EcoHubError>> + Send {
        let result = read(&self.entities).get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, EcoHubError>> + Send {
        let result = read(&self.entities)
            .values()
            .find(|e| e.entity_id == entity_id)
            .cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, EcoHubError>> + Send {
        let result = Self::sorted(read(&self.entities).values().cloned().collect());
        async { Ok(result) }
    }

    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, EcoHubError>> + Send {
        let result = Self::sorted(
            read(&self.entities)
                .values()
                .filter(|e| e.device_id == device_id)
                .cloned()
                .collect(),
        );
        async { Ok(result) }
    }

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, EcoHubError>> + Send {
        let result = {
            let mut entities = write(&self.entities);
            match entities.get_mut(&entity.id) {
                Some(slot) => {
                    *slot = entity.clone();
                    Ok(entity)
                }
                None => Err(NotFoundError {
                    entity: "Entity",
                    id: entity.id.to_string(),
                }
                .into()),
            }
        };
        async { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecohub_domain::entity::EntityState;

    fn sensor(entity_id: &str, device_id: DeviceId) -> Entity {
        Entity::builder()
            .device_id(device_id)
            .entity_id(entity_id)
            .friendly_name("Probe")
            .state(EntityState::On)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_find_created_entity_by_entity_id() {
        let repo = MemoryEntityRepository::new();
        let created = repo
            .create(sensor("sensor.nobo_1", DeviceId::new()))
            .await
            .unwrap();

        let found = repo.find_by_entity_id("sensor.nobo_1").await.unwrap();
        assert_eq!(found.map(|e| e.id), Some(created.id));
        assert!(repo.find_by_entity_id("sensor.nobo_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_entities_sorted_by_entity_id() {
        let repo = MemoryEntityRepository::new();
        let device = DeviceId::new();
        repo.create(sensor("sensor.b", device)).await.unwrap();
        repo.create(sensor("sensor.a", device)).await.unwrap();

        let all = repo.get_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, ["sensor.a", "sensor.b"]);
    }

    #[tokio::test]
    async fn should_filter_by_device() {
        let repo = MemoryEntityRepository::new();
        let device = DeviceId::new();
        repo.create(sensor("sensor.a", device)).await.unwrap();
        repo.create(sensor("sensor.b", DeviceId::new())).await.unwrap();

        assert_eq!(repo.find_by_device_id(device).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_fail_update_of_unknown_entity() {
        let repo = MemoryEntityRepository::new();
        let result = repo.update(sensor("sensor.a", DeviceId::new())).await;
        assert!(matches!(result, Err(EcoHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_share_store_between_clones() {
        let repo = MemoryEntityRepository::new();
        let clone = repo.clone();
        let created = repo
            .create(sensor("sensor.a", DeviceId::new()))
            .await
            .unwrap();
        assert!(clone.get_by_id(created.id).await.unwrap().is_some());
    }
}

//! Entity service: use-cases for managing entities.

use ecohub_domain::entity::Entity;
use ecohub_domain::error::{EcoHubError, NotFoundError};
use ecohub_domain::event::{Event, EventType};
use ecohub_domain::id::EntityId;
use ecohub_domain::time::now;

use crate::ports::{EntityRepository, EventPublisher};

/// Application service for entity state management.
///
/// Every write goes through [`upsert_entity`](Self::upsert_entity), which
/// publishes `EntityCreated` for new entities and `StateChanged` when the
/// state or attributes of a known entity differ from what was stored.
pub struct EntityService<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> EntityService<R, P>
where
    R: EntityRepository,
    P: EventPublisher,
{
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// The event publisher this service reports changes to.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Create or update an entity, matched by its `entity_id` string.
    ///
    /// An existing entity keeps its stored id; `last_changed` only moves
    /// when the state itself changes.
    ///
    /// # Errors
    ///
    /// Returns [`EcoHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    pub async fn upsert_entity(&self, mut entity: Entity) -> Result<Entity, EcoHubError> {
        entity.validate()?;
        let ts = now();

        let Some(existing) = self.repo.find_by_entity_id(&entity.entity_id).await? else {
            entity.last_changed = ts;
            entity.last_updated = ts;
            let created = self.repo.create(entity).await?;
            self.emit(Event::new(
                EventType::EntityCreated,
                Some(created.id),
                serde_json::json!({
                    "entity_id": created.entity_id,
                    "state": created.state,
                }),
            ))
            .await;
            return Ok(created);
        };

        entity.id = existing.id;
        entity.last_changed = if entity.state == existing.state {
            existing.last_changed
        } else {
            ts
        };
        entity.last_updated = ts;

        let changed = existing.differs_from(&entity);
        let updated = self.repo.update(entity).await?;
        if changed {
            tracing::debug!(from = %existing.state, to = %updated.state, "entity state changed");
            self.emit(Event::new(
                EventType::StateChanged,
                Some(updated.id),
                serde_json::json!({
                    "entity_id": updated.entity_id,
                    "from": existing.state,
                    "to": updated.state,
                    "attributes": updated.attributes,
                }),
            ))
            .await;
        }
        Ok(updated)
    }

    /// Look up an entity by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`EcoHubError::NotFound`] when no entity with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, EcoHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all entities.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, EcoHubError> {
        self.repo.get_all().await
    }

    /// Record that a service was called on an entity.
    pub async fn record_service_call(
        &self,
        id: EntityId,
        service: &str,
        data: &serde_json::Value,
    ) {
        self.emit(Event::new(
            EventType::ServiceCalled,
            Some(id),
            serde_json::json!({ "service": service, "data": data }),
        ))
        .await;
    }

    async fn emit(&self, event: Event) {
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(error = %err, "failed to publish entity event");
        }
    }
}

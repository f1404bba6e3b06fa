//! Integration port: lifecycle and service-call handling for device integrations.
//!
//! An integration bridges an external system (a heating hub, …) into ecohub.
//! It discovers devices/entities on setup, keeps their state current from the
//! external system's push updates, and handles service calls directed at
//! entities it owns.

use std::future::Future;

use ecohub_domain::device::Device;
use ecohub_domain::entity::Entity;
use ecohub_domain::error::EcoHubError;
use ecohub_domain::event::Event;
use ecohub_domain::id::EntityId;

/// Context provided to integrations for persisting discoveries and state.
///
/// This is a **port**: adapters call it to persist devices and entities.
/// [`upsert_entity`](Self::upsert_entity) is the state-write primitive an
/// integration calls after recomputing an entity's derived state.
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, EcoHubError>> + Send;

    /// Persist an entity snapshot (create or update by `entity_id` string).
    ///
    /// Also publishes `StateChanged` / `EntityCreated` events through the
    /// event bus when appropriate (delegated to `EntityService`).
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, EcoHubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), EcoHubError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    ///
    /// Returns the entities as stored, which may carry the id of an earlier
    /// registration.
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<Vec<Entity>, EcoHubError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            let mut stored = Vec::with_capacity(dd.entities.len());
            for entity in dd.entities {
                stored.push(self.upsert_entity(entity).await?);
            }
            Ok(stored)
        }
    }
}

/// A pluggable device integration.
///
/// Implementations live in adapter crates (e.g. `adapter_nobo`).
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): connect, discover, persist
/// 2. [`start_background`](Self::start_background): spawn long-running tasks
/// 3. (the server runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown): clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"nobo_hub"`).
    fn name(&self) -> &'static str;

    /// Initialise and persist everything that can be discovered immediately.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), EcoHubError>> + Send;

    /// Start long-running background work (push-update consumers, pollers).
    ///
    /// Spawns internal tasks that persist state via `ctx` and returns
    /// immediately. The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), EcoHubError>> + Send {
        async { Ok(()) }
    }

    /// Whether this integration owns the given entity.
    fn owns_entity(&self, entity_id: EntityId) -> bool;

    /// Handle a service call (e.g. `set_hvac_mode`) for an entity owned by
    /// this integration.
    ///
    /// Returns the entity snapshot after the command was issued. Devices
    /// acknowledge asynchronously, so the snapshot may not reflect the
    /// command yet; the next push update will.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, EcoHubError>> + Send;

    /// Called on graceful shutdown. Clean up any background tasks or connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), EcoHubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}

//! Storage port: repository traits for the hub's state store.

use std::future::Future;

use ecohub_domain::device::Device;
use ecohub_domain::entity::Entity;
use ecohub_domain::error::EcoHubError;
use ecohub_domain::id::{DeviceId, EntityId};

/// Repository for [`Entity`] snapshots.
pub trait EntityRepository {
    /// Insert a new entity.
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, EcoHubError>> + Send;

    /// Get an entity by its unique identifier.
    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, EcoHubError>> + Send;

    /// Get an entity by its human-readable `entity_id` (`climate.…`).
    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, EcoHubError>> + Send;

    /// List all entities.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, EcoHubError>> + Send;

    /// List the entities exposed by a device.
    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, EcoHubError>> + Send;

    /// Replace an existing entity.
    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, EcoHubError>> + Send;
}

/// Repository for [`Device`]s.
pub trait DeviceRepository {
    /// Insert a new device.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, EcoHubError>> + Send;

    /// Get a device by its unique identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, EcoHubError>> + Send;

    /// List all devices.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, EcoHubError>> + Send;

    /// Find a device by the key its integration reports for it.
    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, EcoHubError>> + Send;

    /// Replace an existing device.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, EcoHubError>> + Send;
}

//! Shared application state for axum handlers.

use std::sync::Arc;

use ecohub_app::event_bus::InProcessEventBus;
use ecohub_app::ports::{DeviceRepository, EntityRepository, Integration};
use ecohub_app::services::device_service::DeviceService;
use ecohub_app::services::entity_service::EntityService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types and the integration service calls are
/// forwarded to. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<ER, DR, I> {
    /// Entity queries and event publishing.
    pub entity_service: Arc<EntityService<ER, InProcessEventBus>>,
    /// Device queries.
    pub device_service: Arc<DeviceService<DR>>,
    /// Integration owning the entities service calls are made on.
    pub integration: Arc<I>,
    /// Event bus the SSE stream subscribes to.
    pub event_bus: InProcessEventBus,
}

impl<ER, DR, I> Clone for AppState<ER, DR, I> {
    fn clone(&self) -> Self {
        Self {
            entity_service: Arc::clone(&self.entity_service),
            device_service: Arc::clone(&self.device_service),
            integration: Arc::clone(&self.integration),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<ER, DR, I> AppState<ER, DR, I>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    I: Integration + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Services are shared with the integration's background task, so they
    /// are built before the HTTP state.
    pub fn from_arcs(
        entity_service: Arc<EntityService<ER, InProcessEventBus>>,
        device_service: Arc<DeviceService<DR>>,
        integration: Arc<I>,
    ) -> Self {
        let event_bus = entity_service.publisher().clone();
        Self {
            entity_service,
            device_service,
            integration,
            event_bus,
        }
    }
}

//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod entities;
pub mod events;

use axum::Router;
use axum::routing::{get, post};

use ecohub_app::ports::{DeviceRepository, EntityRepository, Integration};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<ER, DR, I>() -> Router<AppState<ER, DR, I>>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    I: Integration + Send + Sync + 'static,
{
    Router::new()
        // Entities
        .route("/entities", get(entities::list::<ER, DR, I>))
        .route("/entities/{id}", get(entities::get::<ER, DR, I>))
        .route(
            "/entities/{id}/services/{service}",
            post(entities::call_service::<ER, DR, I>),
        )
        // Devices
        .route("/devices", get(devices::list::<ER, DR, I>))
        .route("/devices/{id}", get(devices::get::<ER, DR, I>))
        // Events
        .route("/events/stream", get(events::stream::<ER, DR, I>))
}

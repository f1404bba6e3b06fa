//! JSON REST handlers for entities and service calls.

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use ecohub_app::ports::{DeviceRepository, EntityRepository, Integration};
use ecohub_domain::entity::Entity;
use ecohub_domain::error::ValidationError;
use ecohub_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Entity>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and service-call endpoints.
pub enum GetResponse {
    Ok(Json<Entity>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<EntityId, ApiError> {
    EntityId::from_str(id).map_err(|_| {
        ApiError::from(ValidationError::InvalidId {
            value: id.to_string(),
        })
    })
}

/// `GET /api/entities`
pub async fn list<ER, DR, I>(
    State(state): State<AppState<ER, DR, I>>,
) -> Result<ListResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    I: Integration + Send + Sync + 'static,
{
    let entities = state.entity_service.list_entities().await?;
    Ok(ListResponse::Ok(Json(entities)))
}

/// `GET /api/entities/{id}`
pub async fn get<ER, DR, I>(
    State(state): State<AppState<ER, DR, I>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    I: Integration + Send + Sync + 'static,
{
    let entity = state.entity_service.get_entity(parse_id(&id)?).await?;
    Ok(GetResponse::Ok(Json(entity)))
}

/// `POST /api/entities/{id}/services/{service}`
///
/// The body carries the service data as a JSON object and may be empty.
/// Responds with the entity as the integration sees it right after the
/// command; the stored state follows once the device reports back.
pub async fn call_service<ER, DR, I>(
    State(state): State<AppState<ER, DR, I>>,
    Path((id, service)): Path<(String, String)>,
    body: Bytes,
) -> Result<GetResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    I: Integration + Send + Sync + 'static,
{
    let entity_id = parse_id(&id)?;
    let data = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(&body).map_err(|err| {
            tracing::debug!(error = %err, "malformed service data");
            ApiError::from(ValidationError::InvalidField { field: "body" })
        })?
    };

    let entity = state.entity_service.get_entity(entity_id).await?;
    tracing::info!(entity_id = %entity.entity_id, %service, "service call");
    state
        .entity_service
        .record_service_call(entity_id, &service, &data)
        .await;
    let updated = state
        .integration
        .handle_service_call(entity_id, &service, data)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

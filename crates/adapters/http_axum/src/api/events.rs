//! Server-Sent Events (SSE) stream for real-time updates.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use ecohub_app::ports::{DeviceRepository, EntityRepository, Integration};

use crate::state::AppState;

/// `GET /api/events/stream`: SSE stream of domain events.
///
/// Each `entity_created`, `state_changed` and `service_called` event is sent
/// as a JSON `data:` frame, named after its type. The stream ends when the
/// client disconnects.
pub async fn stream<ER, DR, I>(
    State(state): State<AppState<ER, DR, I>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    I: Integration + Send + Sync + 'static,
{
    let events = BroadcastStream::new(state.event_bus.subscribe()).filter_map(|result| match result {
        Ok(event) => match Event::default()
            .event(event.event_type.as_str())
            .json_data(&event)
        {
            Ok(frame) => Some(Ok(frame)),
            Err(err) => {
                tracing::warn!(%err, "failed to encode event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

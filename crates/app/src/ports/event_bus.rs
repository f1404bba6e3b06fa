//! Event bus port: publish/subscribe for domain events.

use std::future::Future;

use ecohub_domain::error::EcoHubError;
use ecohub_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), EcoHubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), EcoHubError>> + Send {
        (**self).publish(event)
    }
}

//! Event publishing port.
//!
//! Publishing never waits for subscribers. An event nobody listens to is
//! dropped, which is not an error.

use std::future::Future;
use std::sync::Arc;

use pulsehub_domain::error::PulseHubError;
use pulsehub_domain::event::Event;

/// Fan-out of domain events to whoever subscribed.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), PulseHubError>> + Send;

    /// Publish `events` in order, stopping at the first failure.
    fn publish_all(
        &self,
        events: Vec<Event>,
    ) -> impl Future<Output = Result<(), PulseHubError>> + Send {
        async move {
            for event in events {
                self.publish(event).await?;
            }
            Ok(())
        }
    }
}

impl<T: EventPublisher + Send + Sync> EventPublisher for Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), PulseHubError>> + Send {
        T::publish(self, event)
    }
}

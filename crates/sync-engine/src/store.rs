//! Remote event store seam.

use async_trait::async_trait;
use calendar_types::{CalendarEvent, EventDraft};
use event_gateway::{GatewayResult, RemoteGateway};
use session_engine::Credential;

/// The controller's view of the remote event store.
///
/// Implemented by [`RemoteGateway`] in production; tests substitute
/// scripted fakes.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch all events.
    async fn list(&self, credential: &Credential) -> GatewayResult<Vec<CalendarEvent>>;

    /// Create an event from a draft.
    async fn create(
        &self,
        credential: &Credential,
        draft: &EventDraft,
    ) -> GatewayResult<CalendarEvent>;

    /// Delete an event by id.
    async fn remove(&self, credential: &Credential, event_id: &str) -> GatewayResult<()>;
}

#[async_trait]
impl EventStore for RemoteGateway {
    async fn list(&self, credential: &Credential) -> GatewayResult<Vec<CalendarEvent>> {
        self.list_events(credential).await
    }

    async fn create(
        &self,
        credential: &Credential,
        draft: &EventDraft,
    ) -> GatewayResult<CalendarEvent> {
        self.create_event(credential, draft).await
    }

    async fn remove(&self, credential: &Credential, event_id: &str) -> GatewayResult<()> {
        self.delete_event(credential, event_id).await
    }
}

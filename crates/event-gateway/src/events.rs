//! Event endpoints and wire-format translation.
//!
//! The server speaks `start_time`/`end_time`/`created_by`; the client's
//! hydrated model uses `start`/`end`/`owner_id`. The translation lives here
//! because it feeds the `end > start` invariant check downstream — it is a
//! core responsibility, not a presentation concern.

use crate::client::RemoteGateway;
use crate::GatewayResult;
use calendar_types::{CalendarEvent, EventDraft};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use session_engine::Credential;
use tracing::debug;

/// An event as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: String,
}

impl From<EventRecord> for CalendarEvent {
    fn from(record: EventRecord) -> Self {
        CalendarEvent {
            id: record.id,
            title: record.title,
            description: record.description,
            start: record.start_time,
            end: record.end_time,
            owner_id: record.created_by,
        }
    }
}

/// Creation payload in the server's field naming.
#[derive(Debug, Serialize)]
pub(crate) struct CreateEventRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl<'a> From<&'a EventDraft> for CreateEventRequest<'a> {
    fn from(draft: &'a EventDraft) -> Self {
        CreateEventRequest {
            title: &draft.title,
            description: &draft.description,
            start_time: draft.start,
            end_time: draft.end,
        }
    }
}

impl RemoteGateway {
    /// List all events visible to the credential's user.
    pub async fn list_events(&self, credential: &Credential) -> GatewayResult<Vec<CalendarEvent>> {
        let url = self.url("/events/");
        debug!(url = %url, "Listing events");

        let response = self
            .authed(self.http.get(&url), credential)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.classify(response).await);
        }

        let records: Vec<EventRecord> = response.json().await?;
        debug!(count = records.len(), "Listed events");
        Ok(records.into_iter().map(CalendarEvent::from).collect())
    }

    /// Create an event from a draft, returning the hydrated server record.
    pub async fn create_event(
        &self,
        credential: &Credential,
        draft: &EventDraft,
    ) -> GatewayResult<CalendarEvent> {
        let url = self.url("/events/");
        debug!(url = %url, title = %draft.title, "Creating event");

        let response = self
            .authed(self.http.post(&url), credential)
            .json(&CreateEventRequest::from(draft))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.classify(response).await);
        }

        let record: EventRecord = response.json().await?;
        debug!(event_id = %record.id, "Created event");
        Ok(record.into())
    }

    /// Delete an event by id. Fails with `NotFound` when the remote store
    /// has no such event.
    pub async fn delete_event(&self, credential: &Credential, event_id: &str) -> GatewayResult<()> {
        let url = self.url(&format!("/events/{}/", event_id));
        debug!(url = %url, "Deleting event");

        let response = self
            .authed(self.http.delete(&url), credential)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.classify(response).await);
        }

        debug!(event_id = %event_id, "Deleted event");
        Ok(())
    }
}

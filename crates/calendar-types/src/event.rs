//! Calendar event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A hydrated calendar event as held by the client.
///
/// Identity is the `id`: two values with the same `id` are the same logical
/// event at different revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Server-assigned event identifier.
    pub id: String,
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Start instant (UTC).
    pub start: DateTime<Utc>,
    /// End instant (UTC). Must be strictly after `start`.
    pub end: DateTime<Utc>,
    /// User ID of the event creator.
    pub owner_id: String,
}

impl CalendarEvent {
    /// Returns true if the event's time range is valid (`end > start`).
    pub fn has_valid_range(&self) -> bool {
        self.end > self.start
    }
}

/// A not-yet-created event, as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Start instant (UTC).
    pub start: DateTime<Utc>,
    /// End instant (UTC).
    pub end: DateTime<Utc>,
}

impl EventDraft {
    /// Returns true if the draft's time range is valid (`end > start`).
    pub fn has_valid_range(&self) -> bool {
        self.end > self.start
    }
}

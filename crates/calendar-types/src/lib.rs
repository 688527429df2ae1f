//! Shared domain types for the Huddle calendar client.
//!
//! These are the hydrated, client-side representations. Wire-format payloads
//! (with `start_time`/`end_time` field names) live in `event-gateway`.

mod event;
mod identity;

pub use event::{CalendarEvent, EventDraft};
pub use identity::{Identity, Organization};

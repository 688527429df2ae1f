//! Optimistic event synchronization for the Huddle calendar client.
//!
//! This crate owns the locally-cached view of calendar events and keeps it
//! consistent with the remote store:
//!
//! - [`EventCache`]: in-memory mapping of event ids to hydrated records,
//!   the UI's only read path.
//! - [`OwnerColors`]: stable per-owner display colors for the session.
//! - [`SyncController`]: orchestrates loads, creates, and deletes, and
//!   cascades credential rejections into session invalidation.
//!
//! "Optimistic" here means confirmation-only: the cache is updated in
//! response to confirmed operations, never speculatively before the
//! round-trip completes.

mod cache;
mod colors;
mod controller;
mod error;
mod store;

pub use cache::EventCache;
pub use colors::OwnerColors;
pub use controller::SyncController;
pub use error::{SyncError, SyncResult};
pub use store::EventStore;

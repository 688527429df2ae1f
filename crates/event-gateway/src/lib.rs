//! HTTP gateway to the remote Huddle calendar API.
//!
//! The transport boundary: performs authenticated calls against the remote
//! event, user, and organization endpoints and classifies failures into
//! typed outcomes. The gateway performs no retries itself; retry policy
//! belongs to the caller.
//!
//! Credentials are always injected explicitly by the caller — this crate
//! never reads token storage.

mod client;
mod error;
mod events;
mod users;

pub use client::RemoteGateway;
pub use error::{GatewayError, GatewayResult};
pub use users::{AuthPayload, RegisterRequest, UserPayload};

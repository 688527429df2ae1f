//! Session lifecycle for the Huddle calendar client.
//!
//! This crate provides:
//! - Bearer credential decoding (JWT claims, no network)
//! - Explicit FSM-based session state management
//! - Integration with durable storage for token persistence

mod claims;
mod error;
mod session;
mod session_fsm;

pub use claims::{Claims, Credential};
pub use error::{AuthError, AuthResult};
pub use session::{SessionManager, SessionSnapshot};
pub use session_fsm::session_machine;
pub use session_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionState};

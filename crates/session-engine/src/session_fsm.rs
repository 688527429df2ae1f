//! Session state machine using rust-fsm.
//!
//! An explicit finite state machine for the session lifecycle, rather than
//! deriving state from storage checks.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────┐  BeginLogin   ┌─────────────┐
//! │  LoggedOut  │──────────────▶│  LoggingIn  │
//! └─────────────┘               └──────┬──────┘
//!        ▲        LoginFailed          │ LoginSucceeded
//!        │◀─────────────────────────── │
//!        │                             ▼
//!        │   Logout / Invalidate ┌─────────────┐
//!        │◀──────────────────────│   LoggedIn  │
//!        └───────────────────────└─────────────┘
//! ```
//!
//! `Logout` and `Invalidate` are accepted in every state (self-loop in
//! `LoggedOut`), so concurrent invalidation collapses to a single transition
//! instead of erroring on the second attempt.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(LoggedOut)

    LoggedOut => {
        BeginLogin => LoggingIn,
        Logout => LoggedOut,
        Invalidate => LoggedOut
    },
    LoggingIn => {
        LoginSucceeded => LoggedIn,
        LoginFailed => LoggedOut,
        Logout => LoggedOut,
        Invalidate => LoggedOut
    },
    LoggedIn => {
        BeginLogin => LoggingIn,
        Logout => LoggedOut,
        Invalidate => LoggedOut
    }
}

// Re-export the generated types with clearer names
pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Session state for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    LoggedOut,
    /// Login round-trip in flight.
    LoggingIn,
    /// Authenticated with a live credential.
    LoggedIn,
}

impl SessionState {
    /// Returns true if the rest of the system may call the remote store.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::LoggedIn)
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::LoggedOut => SessionState::LoggedOut,
            SessionMachineState::LoggingIn => SessionState::LoggingIn,
            SessionMachineState::LoggedIn => SessionState::LoggedIn,
        }
    }
}

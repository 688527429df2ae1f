//! Session store with FSM-based state tracking.
//!
//! `SessionManager` is the single source of truth for whether the rest of
//! the system may call the remote store. Transient state lives in the FSM;
//! the credential itself is persisted through a [`CredentialStore`] so a
//! live session survives process restarts.

use crate::claims::Credential;
use crate::session_fsm::{SessionMachine, SessionMachineInput, SessionState};
use crate::{AuthError, AuthResult};
use calendar_types::Identity;
use chrono::Utc;
use credential_store::CredentialStore;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Read-only view of the session for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current lifecycle state.
    pub state: SessionState,
    /// Identity of the logged-in user, if any.
    pub identity: Option<Identity>,
    /// Message from the most recent failed login attempt, if any.
    pub last_error: Option<String>,
}

struct SessionInner {
    fsm: SessionMachine,
    credential: Option<Credential>,
    identity: Option<Identity>,
    last_error: Option<String>,
}

/// Process-wide session state.
///
/// All mutation is routed through the named transition operations below;
/// the FSM rejects transitions that make no sense for the current state.
/// `logout` and `invalidate` are total and idempotent: concurrent 401
/// cascades collapse to a single transition.
pub struct SessionManager {
    store: Box<dyn CredentialStore>,
    inner: Mutex<SessionInner>,
}

impl SessionManager {
    /// Create a logged-out session backed by the given store.
    pub fn new(store: Box<dyn CredentialStore>) -> Self {
        Self {
            store,
            inner: Mutex::new(SessionInner {
                fsm: SessionMachine::new(),
                credential: None,
                identity: None,
                last_error: None,
            }),
        }
    }

    /// Create a session from persisted state, resuming a live credential.
    ///
    /// Liveness is checked once, here; there is no background expiry timer.
    /// An expired or undecodable persisted token is cleared and the session
    /// starts logged out. Identity on this path comes from the decoded
    /// claims, not from the server.
    pub fn from_storage(store: Box<dyn CredentialStore>) -> AuthResult<Self> {
        let manager = Self::new(store);

        let raw = match manager.store.load()? {
            Some(raw) => raw,
            None => {
                debug!("No persisted credential found");
                return Ok(manager);
            }
        };

        let credential = match Credential::decode(&raw) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Persisted credential is malformed, clearing it");
                manager.store.clear()?;
                return Ok(manager);
            }
        };

        if !credential.is_live(Utc::now()) {
            info!(
                expires_at = %credential.expires_at,
                "Persisted credential has expired, clearing it"
            );
            manager.store.clear()?;
            return Ok(manager);
        }

        {
            let mut inner = manager.inner.lock().unwrap();
            // Replay the login transitions so the machine resumes authenticated.
            consume(&mut inner.fsm, &SessionMachineInput::BeginLogin)?;
            consume(&mut inner.fsm, &SessionMachineInput::LoginSucceeded)?;
            inner.identity = Some(credential.claimed_identity());
            inner.credential = Some(credential);
        }

        info!("Resumed session from persisted credential");
        Ok(manager)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        let inner = self.inner.lock().unwrap();
        SessionState::from(inner.fsm.state())
    }

    /// Returns true if the session is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// The current credential, if logged in.
    pub fn credential(&self) -> Option<Credential> {
        self.inner.lock().unwrap().credential.clone()
    }

    /// The current identity, if logged in.
    pub fn identity(&self) -> Option<Identity> {
        self.inner.lock().unwrap().identity.clone()
    }

    /// Message from the most recent failed login attempt, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().unwrap().last_error.clone()
    }

    /// Read-only snapshot for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().unwrap();
        SessionSnapshot {
            state: SessionState::from(inner.fsm.state()),
            identity: inner.identity.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    /// Start a login attempt. Clears any previous login error.
    pub fn begin_login(&self) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();
        consume(&mut inner.fsm, &SessionMachineInput::BeginLogin)?;
        inner.last_error = None;
        debug!("Login attempt started");
        Ok(())
    }

    /// Complete a login attempt with the server-issued credential and the
    /// authoritative server-provided identity.
    ///
    /// Persisting the credential is the only side effect on this path.
    pub fn complete_login(&self, credential: Credential, identity: Identity) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if SessionState::from(inner.fsm.state()) != SessionState::LoggingIn {
            return Err(AuthError::InvalidStateTransition(
                "complete_login requires an in-flight login attempt".to_string(),
            ));
        }

        self.store.save(&credential.token)?;
        consume(&mut inner.fsm, &SessionMachineInput::LoginSucceeded)?;
        info!(user_id = %identity.id, "Login successful");
        inner.identity = Some(identity);
        inner.credential = Some(credential);
        Ok(())
    }

    /// Record a failed login attempt.
    pub fn fail_login(&self, message: impl Into<String>) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();
        consume(&mut inner.fsm, &SessionMachineInput::LoginFailed)?;
        let message = message.into();
        warn!(error = %message, "Login failed");
        inner.last_error = Some(message);
        inner.credential = None;
        inner.identity = None;
        Ok(())
    }

    /// Log out, clearing the persisted credential and identity.
    ///
    /// A prior failed attempt's error is kept until a new attempt starts.
    pub fn logout(&self) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();
        consume(&mut inner.fsm, &SessionMachineInput::Logout)?;
        // Drop the in-memory credential before touching storage: a failed
        // clear must not leave a LoggedOut session still handing out the
        // old credential.
        inner.credential = None;
        inner.identity = None;
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Invalidate the session after the remote store rejected the credential.
    ///
    /// Equivalent to [`SessionManager::logout`], but idempotent under
    /// concurrent invalidation: multiple in-flight requests failing at once
    /// collapse to one transition, the rest are no-ops.
    pub fn invalidate(&self) -> AuthResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let was_authenticated =
            SessionState::from(inner.fsm.state()) != SessionState::LoggedOut;
        consume(&mut inner.fsm, &SessionMachineInput::Invalidate)?;
        // Same ordering as `logout`: in-memory state first, storage second.
        inner.credential = None;
        inner.identity = None;
        self.store.clear()?;

        if was_authenticated {
            info!("Session invalidated: credential no longer accepted by the remote store");
        } else {
            debug!("Session already logged out, invalidation is a no-op");
        }
        Ok(())
    }
}

fn consume(fsm: &mut SessionMachine, input: &SessionMachineInput) -> AuthResult<()> {
    fsm.consume(input).map_err(|_| {
        AuthError::InvalidStateTransition(format!(
            "Cannot apply {:?} in state {:?}",
            input,
            fsm.state()
        ))
    })?;
    Ok(())
}

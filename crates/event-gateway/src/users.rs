//! User and organization endpoints.

use crate::client::RemoteGateway;
use crate::error::server_message;
use crate::{GatewayError, GatewayResult};
use calendar_types::{Identity, Organization};
use serde::{Deserialize, Serialize};
use session_engine::Credential;
use tracing::{debug, warn};

/// Response from the login and register endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    /// Bearer access token.
    pub access: String,
    /// Authoritative server-provided user.
    pub user: UserPayload,
}

/// User as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
}

impl From<UserPayload> for Identity {
    fn from(user: UserPayload) -> Self {
        Identity {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            organization_id: user.organization_id,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Organization ID chosen from [`RemoteGateway::organizations`].
    pub organization: i64,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl RemoteGateway {
    /// Authenticate with email and password.
    ///
    /// No credential is attached: this is the call that obtains one. A
    /// rejection here is a failed login attempt, not a session invalidation,
    /// so every 4xx maps to `ValidationRejected` with the server's message.
    pub async fn login(&self, email: &str, password: &str) -> GatewayResult<AuthPayload> {
        let url = self.url("/users/login/");
        debug!(url = %url, email = %email, "Attempting login");

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        Self::auth_response(response, "Login failed").await
    }

    /// Register a new account. Returns the same payload as login: the new
    /// user is immediately authenticated.
    pub async fn register(&self, request: &RegisterRequest) -> GatewayResult<AuthPayload> {
        let url = self.url("/users/register/");
        debug!(url = %url, email = %request.email, "Registering user");

        let response = self.http.post(&url).json(request).send().await?;
        Self::auth_response(response, "Registration failed").await
    }

    /// List organizations (reference data for registration).
    ///
    /// Serves anonymous callers too: a fresh user picks an organization
    /// before having any credential to attach.
    pub async fn organizations(
        &self,
        credential: Option<&Credential>,
    ) -> GatewayResult<Vec<Organization>> {
        let url = self.url("/users/organizations/");
        debug!(url = %url, authenticated = credential.is_some(), "Listing organizations");

        let response = self
            .maybe_authed(self.http.get(&url), credential)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.classify(response).await);
        }

        Ok(response.json().await?)
    }

    async fn auth_response(
        response: reqwest::Response,
        fallback: &str,
    ) -> GatewayResult<AuthPayload> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Auth request rejected");
        if status.is_server_error() {
            return Err(GatewayError::Transient(format!("HTTP {}", status)));
        }
        Err(GatewayError::ValidationRejected(
            server_message(&body).unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

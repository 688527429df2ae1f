//! Remote API client.

use crate::GatewayError;
use reqwest::{Client, Response};
use session_engine::Credential;

/// HTTP client for the remote Huddle calendar API.
///
/// Thin transport: attaches the injected credential, performs the call,
/// and classifies the outcome. Holds no session or cache state.
#[derive(Clone)]
pub struct RemoteGateway {
    pub(crate) http: Client,
    pub(crate) base_url: String,
}

impl RemoteGateway {
    /// Create a gateway for the given API base URL (e.g. `https://api.huddle.dev/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build an authenticated request with the injected credential.
    pub(crate) fn authed(
        &self,
        builder: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", credential.token))
    }

    /// Like [`RemoteGateway::authed`], but for endpoints that also serve
    /// anonymous callers: the bearer header is attached only when a
    /// credential is present.
    pub(crate) fn maybe_authed(
        &self,
        builder: reqwest::RequestBuilder,
        credential: Option<&Credential>,
    ) -> reqwest::RequestBuilder {
        match credential {
            Some(credential) => self.authed(builder, credential),
            None => builder,
        }
    }

    /// Classify a non-success response into a typed outcome.
    pub(crate) async fn classify(&self, response: Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        GatewayError::from_status(status, &body)
    }
}

//! Bearer credential decoding.
//!
//! The API issues JWT-shaped access tokens. The client never verifies the
//! signature (the server does that on every request); it only needs the
//! payload claims for the subject identity and the expiry instant.

use crate::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use calendar_types::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decoded token claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: String,
    /// Expiry as a unix timestamp (seconds).
    pub exp: i64,
    /// Email address, when the issuer includes it.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, when the issuer includes it.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Organization ID, when the issuer includes it.
    #[serde(default)]
    pub organization_id: Option<i64>,
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Identity {
            id: claims.sub.clone(),
            email: claims.email.clone().unwrap_or_default(),
            full_name: claims.full_name.clone(),
            organization_id: claims.organization_id,
        }
    }
}

/// An opaque bearer token together with its decoded claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// The raw token, attached verbatim as `Authorization: Bearer <token>`.
    pub token: String,
    /// Claims decoded from the token payload.
    pub claims: Claims,
    /// Expiry instant derived from the `exp` claim.
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Decode a raw token into a structured credential.
    ///
    /// Pure and deterministic; no I/O. Fails with
    /// [`AuthError::MalformedCredential`] when the token cannot be parsed
    /// into the expected claim shape. An expired-but-well-formed token
    /// decodes successfully; check [`Credential::is_live`] separately.
    pub fn decode(raw: &str) -> AuthResult<Credential> {
        let mut parts = raw.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_header), Some(payload), Some(_signature), None) => payload,
            _ => {
                return Err(AuthError::MalformedCredential(
                    "Expected three dot-separated token segments".to_string(),
                ))
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| AuthError::MalformedCredential(format!("Payload is not base64url: {e}")))?;

        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::MalformedCredential(format!("Unexpected claim shape: {e}")))?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or_else(|| {
            AuthError::MalformedCredential(format!("Expiry {} is out of range", claims.exp))
        })?;

        Ok(Credential {
            token: raw.to_string(),
            claims,
            expires_at,
        })
    }

    /// Returns true if the credential has not yet expired at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Identity derived from the decoded claims (fast path, not the
    /// authoritative server-provided identity).
    pub fn claimed_identity(&self) -> Identity {
        Identity::from(&self.claims)
    }
}

/// Mint an unsigned JWT-shaped token from a claims JSON value.
#[cfg(test)]
pub(crate) fn mint_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}

//! User identity and organization reference data.

use serde::{Deserialize, Serialize};

/// An authenticated user's identity.
///
/// Derived either from decoded token claims (fast path at startup) or from
/// the server's login/register response (authoritative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Organization the user belongs to.
    #[serde(default)]
    pub organization_id: Option<i64>,
}

/// An organization, read-only reference data for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization ID.
    pub id: i64,
    /// Display name.
    pub name: String,
}

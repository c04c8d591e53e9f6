//! User identity decoded from a verified Casdoor JWT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a Casdoor access token.
///
/// The common user fields are typed. Every other claim (`sub`, `exp`,
/// `roles`, custom properties, ...) is kept in `claims` and serialized back
/// unchanged, so the identity can be returned to clients as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Organization the user belongs to
    #[serde(default)]
    pub owner: String,
    /// User name, unique inside the organization
    #[serde(default)]
    pub name: String,
    /// Casdoor user ID
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Avatar URL
    #[serde(default)]
    pub avatar: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Whether the user administers its organization
    #[serde(default)]
    pub is_admin: bool,
    /// Remaining claims
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl UserIdentity {
    /// `sub` claim, if present.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// `owner/name`, the form Casdoor uses to address a user.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

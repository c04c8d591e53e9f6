//! Access tokens returned by the token endpoint

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::OAuthError;

/// Casdoor reports some failures in-band by prefixing the access token.
const IN_BAND_ERROR_PREFIX: &str = "error:";

/// OAuth token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access token (a Casdoor-signed JWT)
    pub access_token: String,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Refresh token (optional)
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Absolute expiry, when the provider sent `expires_in`
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Raw body of the token endpoint.
///
/// Success and error bodies share one shape; everything is optional so a
/// provider error can be read from the same struct.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    /// Access token
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token type
    #[serde(default)]
    pub token_type: Option<String>,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Granted scope
    #[serde(default)]
    pub scope: Option<String>,
    /// OAuth error code
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable error detail
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Turn the response into a [`Token`], resolving `expires_in` against `now`.
    pub fn into_token(self, now: DateTime<Utc>) -> Result<Token, OAuthError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            let message = match self.error_description.filter(|d| !d.is_empty()) {
                Some(description) => format!("{error}: {description}"),
                None => error,
            };
            return Err(OAuthError::Provider(message));
        }

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| OAuthError::InvalidResponse("missing access_token".to_string()))?;

        if let Some(message) = access_token.strip_prefix(IN_BAND_ERROR_PREFIX) {
            return Err(OAuthError::Provider(message.trim().to_string()));
        }

        let expiry = self
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));

        Ok(Token {
            access_token,
            token_type: self
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_token_type),
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expiry,
        })
    }
}

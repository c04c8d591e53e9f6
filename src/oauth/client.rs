//! Casdoor client
//!
//! Implements [`IdentityProvider`] against a Casdoor server:
//!
//! - sign-in URL: `{endpoint}/login/oauth/authorize`
//! - token exchange: `POST {endpoint}/api/login/oauth/access_token`
//! - JWT verification: local, against the application's certificate

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::certificate::{self, SigningKey};
use super::{IdentityProvider, OAuthError, Token, TokenResponse, UserIdentity};
use crate::config::CasdoorConfig;

/// Scope Casdoor expects on the authorization request
const SIGNIN_SCOPE: &str = "read";

/// OAuth client for one Casdoor application
pub struct CasdoorClient {
    /// HTTP client for token requests
    http_client: Client,

    /// Base URL without trailing slash
    endpoint: String,

    client_id: String,
    client_secret: String,
    organization: String,
    application: String,

    /// Parsed certificate, or why it could not be parsed
    signing_key: Result<SigningKey, String>,
}

impl CasdoorClient {
    /// Create a client from configuration.
    ///
    /// Never fails: a bad certificate is logged and reported on each
    /// [`parse_token`](IdentityProvider::parse_token) call instead.
    #[must_use]
    pub fn new(config: &CasdoorConfig) -> Self {
        let http_client = Client::builder()
            .user_agent(concat!("casdoor-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self::with_http_client(config, http_client)
    }

    /// Create a client that sends token requests through `http_client`.
    #[must_use]
    pub fn with_http_client(config: &CasdoorConfig, http_client: Client) -> Self {
        let pem = config.certificate_pem();
        let signing_key = match SigningKey::from_pem(&pem) {
            Ok(key) => {
                certificate::log_certificate_status(&pem);
                debug!(kind = ?key.kind(), "Loaded JWT signing key");
                Ok(key)
            }
            Err(e) => {
                warn!(error = %e, "No usable signing certificate, token verification will fail");
                Err(e.to_string())
            }
        };

        Self {
            http_client,
            endpoint: config.endpoint.trim().trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            organization: config.organization.clone(),
            application: config.application.clone(),
            signing_key,
        }
    }

    /// Casdoor base URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Organization name
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Application name
    #[must_use]
    pub fn application(&self) -> &str {
        &self.application
    }

    fn token_url(&self) -> String {
        format!("{}/api/login/oauth/access_token", self.endpoint)
    }
}

#[async_trait]
impl IdentityProvider for CasdoorClient {
    fn signin_url(&self, redirect_uri: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", SIGNIN_SCOPE)
            .append_pair("state", &self.application)
            .finish();

        format!("{}/login/oauth/authorize?{query}", self.endpoint)
    }

    async fn exchange_code(&self, code: &str, state: &str) -> Result<Token, OAuthError> {
        debug!(state = %state, "Exchanging authorization code");

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(self.token_url())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed = match serde_json::from_str::<TokenResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(OAuthError::Provider(format!("HTTP {status}")));
            }
            Err(e) => return Err(OAuthError::InvalidResponse(e.to_string())),
        };

        if !status.is_success() && parsed.error.is_none() {
            return Err(OAuthError::Provider(format!("HTTP {status}")));
        }

        parsed.into_token(Utc::now())
    }

    async fn parse_token(&self, token: &str) -> Result<UserIdentity, OAuthError> {
        let key = self
            .signing_key
            .as_ref()
            .map_err(|e| OAuthError::Certificate(e.clone()))?;

        let validation = key.validation(&self.client_id);
        let data = jsonwebtoken::decode::<UserIdentity>(token, key.decoding_key(), &validation)?;
        Ok(data.claims)
    }
}

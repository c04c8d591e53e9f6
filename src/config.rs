//! Configuration management
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! YAML file, `CASDOOR_*` environment variables, `PORT`. A `.env` file in
//! the working directory is loaded into the process environment first.

use std::fmt;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Port used when neither `PORT` nor the config file sets one
pub const DEFAULT_PORT: u16 = 8080;

/// Redirect URI used when `CASDOOR_REDIRECT_URI` is unset or empty
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Identity provider configuration
    pub casdoor: CasdoorConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Casdoor application settings
///
/// Mirrors the six values a Casdoor SDK client needs plus the redirect URI
/// sent on sign-in.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasdoorConfig {
    /// Casdoor base URL, e.g. `http://localhost:8000`
    pub endpoint: String,
    /// OAuth client ID of the Casdoor application
    pub client_id: String,
    /// OAuth client secret of the Casdoor application
    pub client_secret: String,
    /// PEM certificate (or public key) used to verify JWT signatures
    pub certificate: String,
    /// Casdoor organization name
    pub organization: String,
    /// Casdoor application name
    pub application: String,
    /// Callback URL registered with the application
    pub redirect_uri: Option<String>,
}

impl fmt::Debug for CasdoorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasdoorConfig")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("certificate", &format_args!("<{} bytes>", self.certificate.len()))
            .field("organization", &self.organization)
            .field("application", &self.application)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl CasdoorConfig {
    /// Configured redirect URI, or [`DEFAULT_REDIRECT_URI`] when unset or empty.
    ///
    /// The boolean is `true` when the default was used.
    #[must_use]
    pub fn resolve_redirect_uri(&self) -> (String, bool) {
        match self.redirect_uri.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => (uri.to_string(), false),
            _ => (DEFAULT_REDIRECT_URI.to_string(), true),
        }
    }

    /// Certificate with literal `\n` escapes turned into line breaks.
    ///
    /// PEM blocks are often squashed onto one line when passed through an
    /// environment variable.
    #[must_use]
    pub fn certificate_pem(&self) -> String {
        self.certificate.replace("\\n", "\n").trim().to_string()
    }

    /// Names of settings that are empty.
    ///
    /// The server still starts without them; requests that need them fail.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("endpoint", &self.endpoint),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("certificate", &self.certificate),
            ("organization", &self.organization),
            ("application", &self.application),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(env_path) => tracing::debug!("Loaded env file: {}", env_path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("Failed to load .env file: {e}"),
        }

        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // CASDOOR_CLIENT_ID -> casdoor.client_id
        figment = figment
            .merge(Env::prefixed("CASDOOR_").map(|key| format!("casdoor.{key}").into()))
            .merge(Env::raw().only(&["port"]).map(|_| "server.port".into()));

        let config: Self = figment.extract()?;
        Ok(config)
    }
}

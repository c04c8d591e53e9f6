//! Casdoor Gateway Library
//!
//! A small axum server that walks a browser through the Casdoor OAuth2/OIDC
//! authorization-code flow and protects routes with Casdoor-signed JWTs.
//!
//! # Routes
//!
//! - `GET /` and `GET /login`: public, no token needed
//! - `GET /callback`: exchanges the authorization code and returns the user
//! - `GET /profile` and `GET /logout`: require `Authorization: Bearer <jwt>`
//!
//! All provider interaction goes through the [`oauth::IdentityProvider`]
//! trait; [`oauth::CasdoorClient`] is the production implementation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod oauth;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Internal(e.to_string()))?,
        _ => subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| Error::Internal(e.to_string()))?,
    }

    Ok(())
}

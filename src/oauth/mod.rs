//! Identity provider adapter
//!
//! The gateway talks to its identity provider through [`IdentityProvider`]:
//! build a sign-in URL, trade an authorization code for a [`Token`], and
//! verify a JWT into a [`UserIdentity`]. [`CasdoorClient`] implements it
//! against a Casdoor server.

pub mod certificate;
pub mod client;
pub mod identity;
pub mod token;

use async_trait::async_trait;

pub use certificate::{CertificateInfo, SigningKey};
pub use client::CasdoorClient;
pub use identity::UserIdentity;
pub use token::{Token, TokenResponse};

/// Identity provider failures.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Network or HTTP-level error talking to the provider.
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered but refused the request.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider's answer could not be understood.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// JWT decode / signature / claim validation failed.
    #[error("JWT verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// No usable signing key is configured.
    #[error("signing certificate unavailable: {0}")]
    Certificate(String),
}

/// Operations the gateway needs from an identity provider.
///
/// Implementations are shared across request tasks behind an `Arc`, hence
/// `Send + Sync`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization-request URL that sends the user back to `redirect_uri`.
    fn signin_url(&self, redirect_uri: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str, state: &str) -> Result<Token, OAuthError>;

    /// Verify a JWT and decode the user it describes.
    async fn parse_token(&self, token: &str) -> Result<UserIdentity, OAuthError>;
}

//! Authentication middleware for the Casdoor gateway
//!
//! A request is authenticated when its `Authorization` header carries a JWT
//! that the identity provider verifies. The `Bearer ` prefix is optional.
//!
//! [`authenticate`] is the single validation path. The middleware uses it to
//! guard the protected routes, and the [`AuthenticatedUser`] extractor uses
//! it when a handler is reached without the middleware having run.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::error::ApiError;
use super::router::AppState;
use crate::oauth::{IdentityProvider, UserIdentity};

/// Message for requests without a token
pub const MISSING_TOKEN: &str = "No authorization token provided";

/// Message for tokens the provider rejects
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Identity of the caller, stored in request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserIdentity);

/// Token carried by the `Authorization` header.
///
/// `Bearer ` is stripped when something follows it. Returns `None` when the
/// header is absent, empty, or not valid UTF-8.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    if value.is_empty() {
        return None;
    }

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Some(token),
        _ => Some(value),
    }
}

/// Validate the request's bearer token against `provider`.
pub async fn authenticate(
    provider: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Err(ApiError::Unauthorized(MISSING_TOKEN.to_string()));
    };

    match provider.parse_token(token).await {
        Ok(identity) => Ok(AuthenticatedUser(identity)),
        Err(e) => {
            debug!(error = %e, "Token verification failed");
            Err(ApiError::Unauthorized(INVALID_TOKEN.to_string()))
        }
    }
}

/// Authentication middleware for the protected route group
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match authenticate(state.provider.as_ref(), request.headers()).await {
        Ok(user) => {
            debug!(user = %user.0.qualified_name(), path = %path, "Authenticated request");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %path, reason = %e, "Rejected unauthenticated request");
            e.into_response()
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        authenticate(state.provider.as_ref(), &parts.headers).await
    }
}

//! Route handlers
//!
//! All handlers answer JSON. Provider failures are mapped to [`ApiError`]
//! here; nothing is retried.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::auth::AuthenticatedUser;
use super::error::ApiError;
use super::router::AppState;

/// Query string of `GET /callback`
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code issued by the provider
    #[serde(default)]
    pub code: Option<String>,
    /// Opaque state echoed back by the provider
    #[serde(default)]
    pub state: Option<String>,
}

/// `GET /`
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Welcome! Go to /login to authenticate",
        "status": "unauthenticated",
    }))
}

/// `GET /login` - hand the client the provider's sign-in URL
pub async fn login(State(state): State<Arc<AppState>>) -> Json<Value> {
    let auth_url = state.provider.signin_url(&state.redirect_uri);

    Json(json!({
        "auth_url": auth_url,
        "message": "Redirect user to this URL for authentication",
    }))
}

/// `GET /callback` - exchange the code and return the signed-in user
pub async fn callback(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Malformed callback query");
        ApiError::MissingParameter(rejection.body_text())
    })?;

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Err(ApiError::MissingParameter(
            "Authorization code not provided".to_string(),
        ));
    };

    // TODO: bind `state` to the login request (e.g. a signed cookie) instead of
    // only checking that it is present.
    let Some(oauth_state) = query.state.filter(|s| !s.is_empty()) else {
        return Err(ApiError::MissingParameter(
            "Invalid state parameter".to_string(),
        ));
    };

    if let Some(expected) = state.expected_state.as_deref() {
        if expected != oauth_state {
            warn!(expected = %expected, received = %oauth_state, "Callback state does not match sign-in state");
        }
    }

    let token = state
        .provider
        .exchange_code(&code, &oauth_state)
        .await
        .map_err(|e| {
            error!(error = %e, "Token exchange failed");
            ApiError::Upstream(format!("Failed to get token: {e}"))
        })?;

    let user = state
        .provider
        .parse_token(&token.access_token)
        .await
        .map_err(|e| {
            error!(error = %e, "Issued token failed verification");
            ApiError::Upstream(format!("Failed to parse token: {e}"))
        })?;

    info!(
        user = %user.qualified_name(),
        sub = user.subject().unwrap_or_default(),
        "User signed in"
    );

    Ok(Json(json!({
        "message": "Authentication successful",
        "user": user,
        "access_token": token.access_token,
        "expires_in": token.expiry,
    })))
}

/// `GET /profile`
pub async fn profile(AuthenticatedUser(user): AuthenticatedUser) -> Json<Value> {
    Json(json!({ "user": user }))
}

/// `GET /logout` - stateless; there is no server-side session to clear
pub async fn logout(AuthenticatedUser(user): AuthenticatedUser) -> Json<Value> {
    info!(user = %user.qualified_name(), "User logged out");

    Json(json!({ "message": "Logged out successfully" }))
}

//! HTTP router

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::auth::auth_middleware;
use super::handlers;
use crate::oauth::IdentityProvider;

/// Shared application state
pub struct AppState {
    /// Identity provider adapter
    pub provider: Arc<dyn IdentityProvider>,
    /// Redirect URI sent on sign-in
    pub redirect_uri: String,
    /// `state` value the sign-in URL carries, if known
    pub expected_state: Option<String>,
}

impl AppState {
    /// Create state around `provider`
    pub fn new(provider: Arc<dyn IdentityProvider>, redirect_uri: impl Into<String>) -> Self {
        Self {
            provider,
            redirect_uri: redirect_uri.into(),
            expected_state: None,
        }
    }

    /// Warn when a callback's `state` differs from `expected`
    #[must_use]
    pub fn with_expected_state(mut self, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        self.expected_state = (!expected.is_empty()).then_some(expected);
        self
    }
}

/// Create the router
///
/// `/`, `/login` and `/callback` are public. `/profile` and `/logout` sit
/// behind [`auth_middleware`].
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/profile", get(handlers::profile))
        .route("/logout", get(handlers::logout))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::home))
        .route("/login", get(handlers::login))
        .route("/callback", get(handlers::callback))
        .merge(protected)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

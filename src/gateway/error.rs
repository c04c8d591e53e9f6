//! HTTP-facing errors
//!
//! Every failure a client can see is one of three kinds, rendered as
//! `{"error": "<message>"}` with the matching status.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Request-level error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query parameter is absent or malformed (400).
    #[error("{0}")]
    MissingParameter(String),

    /// The caller is not authenticated (401).
    #[error("{0}")]
    Unauthorized(String),

    /// The identity provider failed while serving the request (500).
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::MissingParameter("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn unauthorized_carries_challenge_header() {
        let response = ApiError::Unauthorized("Invalid or expired token".into()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(
            body_json(response).await,
            json!({"error": "Invalid or expired token"})
        );
    }

    #[tokio::test]
    async fn bad_request_has_error_body_only() {
        let response =
            ApiError::MissingParameter("Authorization code not provided".into()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
        assert_eq!(
            body_json(response).await,
            json!({"error": "Authorization code not provided"})
        );
    }
}

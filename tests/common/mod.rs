//! Shared helpers for gateway integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use casdoor_gateway::gateway::{AppState, create_router};
use casdoor_gateway::oauth::{IdentityProvider, OAuthError, Token, UserIdentity};
use chrono::{TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rcgen::{CertificateParams, KeyPair};
use serde_json::{Value, json};

pub const VALID_TOKEN: &str = "valid.jwt.token";
pub const GOOD_CODE: &str = "good-code";
pub const REJECTED_CODE: &str = "rejected-code";
/// Exchanges fine but yields a token the provider cannot verify
pub const UNVERIFIABLE_CODE: &str = "unverifiable-code";

/// In-memory identity provider with fixed answers.
#[derive(Default)]
pub struct StubProvider {
    pub parse_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
}

impl StubProvider {
    pub fn user() -> UserIdentity {
        serde_json::from_value(json!({
            "owner": "built-in",
            "name": "alice",
            "displayName": "Alice",
            "email": "alice@example.com",
            "sub": "user-1"
        }))
        .unwrap()
    }

    pub fn parse_count(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn signin_url(&self, redirect_uri: &str) -> String {
        format!("https://idp.test/login/oauth/authorize?redirect_uri={redirect_uri}")
    }

    async fn exchange_code(&self, code: &str, _state: &str) -> Result<Token, OAuthError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        let access_token = match code {
            GOOD_CODE => VALID_TOKEN,
            UNVERIFIABLE_CODE => "garbage",
            _ => return Err(OAuthError::Provider("invalid_grant".to_string())),
        };
        Ok(Token {
            access_token: access_token.to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
        })
    }

    async fn parse_token(&self, token: &str) -> Result<UserIdentity, OAuthError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        if token == VALID_TOKEN {
            Ok(Self::user())
        } else {
            Err(OAuthError::Jwt(ErrorKind::InvalidToken.into()))
        }
    }
}

/// Router over a fresh [`StubProvider`], plus a handle to inspect it.
pub fn stub_app(redirect_uri: &str) -> (Router, Arc<StubProvider>) {
    let provider = Arc::new(StubProvider::default());
    let state = Arc::new(
        AppState::new(provider.clone(), redirect_uri).with_expected_state("app-demo"),
    );
    (create_router(state), provider)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_auth(uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", authorization)
        .body(Body::empty())
        .unwrap()
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Self-signed EC certificate and the key that signs tokens for it.
pub struct TestSigner {
    pub certificate_pem: String,
    encoding_key: EncodingKey,
}

impl TestSigner {
    pub fn generate() -> Self {
        let key_pair = KeyPair::generate().unwrap();
        let params = CertificateParams::new(vec!["casdoor.test".to_string()]).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        Self {
            certificate_pem: cert.pem(),
            encoding_key: EncodingKey::from_ec_pem(key_pair.serialize_pem().as_bytes()).unwrap(),
        }
    }

    pub fn sign(&self, claims: &Value) -> String {
        jsonwebtoken::encode(&Header::new(Algorithm::ES256), claims, &self.encoding_key).unwrap()
    }

    /// Access token for `name`, valid for ten minutes, issued to `client_id`.
    pub fn access_token(&self, client_id: &str, name: &str) -> String {
        self.sign(&json!({
            "owner": "built-in",
            "name": name,
            "displayName": name.to_uppercase(),
            "sub": format!("{name}-id"),
            "aud": [client_id],
            "exp": Utc::now().timestamp() + 600,
            "tokenType": "access-token"
        }))
    }
}

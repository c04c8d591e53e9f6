//! Listener and graceful-shutdown tests over a real socket

mod common;

use std::sync::Arc;

use casdoor_gateway::Error;
use casdoor_gateway::config::ServerConfig;
use casdoor_gateway::gateway::{AppState, Gateway};
use common::*;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn loopback(port: u16) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
    }
}

fn state() -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(StubProvider::default()),
        "http://localhost:8080/callback",
    ))
}

#[tokio::test]
async fn bind_on_occupied_port_fails_with_bind_error() {
    // GIVEN: a port already held by another listener
    let holder = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = holder.local_addr().unwrap().port();

    // WHEN: the gateway tries to bind the same port
    let result = Gateway::bind(&loopback(port), state()).await;

    // THEN: a bind error naming the address
    match result {
        Err(Error::Bind { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{port}")),
        Err(other) => panic!("expected bind error, got {other}"),
        Ok(_) => panic!("bind unexpectedly succeeded"),
    }
}

#[tokio::test]
async fn serves_requests_until_shutdown() {
    // GIVEN: a gateway on an ephemeral port
    let gateway = Gateway::bind(&loopback(0), state()).await.unwrap();
    let addr = gateway.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(gateway.run_until(async {
        let _ = stop_rx.await;
    }));

    // WHEN: a client hits the public and protected routes
    let client = reqwest::Client::new();
    let home = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    let profile = client
        .get(format!("http://{addr}/profile"))
        .send()
        .await
        .unwrap();

    // THEN: the router answers over the socket
    assert_eq!(home.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = home.json().await.unwrap();
    assert_eq!(body["status"], "unauthenticated");
    assert_eq!(profile.status(), reqwest::StatusCode::UNAUTHORIZED);

    // AND: the server exits cleanly once signalled
    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

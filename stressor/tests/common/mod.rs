//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{Router, body::Body, http::Request, response::Response};
use stressor::config::ServerConfig;
use stressor::server::{AppState, build_app};

pub const MIB: usize = 1024 * 1024;
pub const BOUNDARY: &str = "stressor-test-boundary";

/// Create a test application router with state
pub fn create_test_app_with_config(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::new(config);
    (build_app(state.clone()), state)
}

/// Create a test application router with default configuration
pub fn create_test_app_with_state() -> (Router, AppState) {
    create_test_app_with_config(ServerConfig::default())
}

pub fn create_test_app() -> Router {
    create_test_app_with_state().0
}

/// Bind the app on an ephemeral localhost port and serve it in the background
pub async fn spawn_test_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_test_app();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Build a multipart/form-data body with a single part
pub fn multipart_body(field_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"payload.bin\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

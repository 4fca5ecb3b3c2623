//! Common test utilities for coin-shop integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use serde_json::json;

use coin_shop_core::default_catalog;
use coin_shop_service::{create_router, AppState, ServiceConfig};
use coin_shop_store::{seed_catalog, MemoryStore};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
}

impl TestHarness {
    /// Create a new test harness with an in-memory store and the default catalog.
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        seed_catalog(&store, &default_catalog())
            .await
            .expect("Failed to seed catalog");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        Self { server }
    }

    /// Log in as `username` (registering on first use) and return the token.
    pub async fn token(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/auth")
            .json(&json!({ "username": username, "password": "password" }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["token"]
            .as_str()
            .expect("token missing from response")
            .to_string()
    }

    /// Fetch `/api/info` for a token.
    pub async fn info(&self, token: &str) -> serde_json::Value {
        let (name, value) = bearer(token);
        let response = self.server.get("/api/info").add_header(name, value).await;
        response.assert_status_ok();
        response.json()
    }
}

/// The `Authorization` header for a bearer token.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value"),
    )
}

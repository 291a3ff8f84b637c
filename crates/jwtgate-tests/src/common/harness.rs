// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Serves a router on an ephemeral local port and drives it over real HTTP.
//! The server task is aborted when the [`TestServer`] is dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use jwtgate_api::{AuthRouter, Claims, MaybeClaims, RequireUserData, RoutePolicy};
use jwtgate_core::AuthManager;
use reqwest::{header, Response};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// =============================================================================
// Test Application
// =============================================================================

/// Auth routes under `/auth` plus:
///
/// | Route | Policy |
/// |-------|--------|
/// | `GET /api/message` | authenticated |
/// | `GET /api/admin` | `user_data.role == "admin"` |
/// | `GET /api/public` | soft |
pub fn gated_app(manager: Arc<AuthManager>) -> Router {
    gated_router(manager).into_router()
}

/// The [`gated_app`] routes before conversion, for adding routes or a getter.
pub fn gated_router(manager: Arc<AuthManager>) -> AuthRouter {
    AuthRouter::new(manager)
        .with_auth_routes()
        .route("/api/message", get(message), RoutePolicy::authenticated())
        .route(
            "/api/admin",
            get(message),
            RoutePolicy::authenticated().rule(RequireUserData::new("role", "admin")),
        )
        .route("/api/public", get(whoami), RoutePolicy::soft())
}

async fn message(Claims(claims): Claims) -> Json<Value> {
    Json(json!({ "message": "protected", "username": claims.subject }))
}

async fn whoami(MaybeClaims(claims): MaybeClaims) -> Json<Value> {
    Json(json!({ "username": claims.map(|c| c.subject) }))
}

// =============================================================================
// TestServer
// =============================================================================

/// A router served on `127.0.0.1:<ephemeral>`.
pub struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Binds an ephemeral port and starts serving `app`.
    pub async fn start(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            handle,
        }
    }

    /// Address the server listens on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Absolute URL of a path.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// The shared HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// `GET path` without credentials.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// `GET path` with a bearer token.
    pub async fn get_with_token(&self, path: &str, token: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("GET request failed")
    }

    /// `GET path` carrying the access token cookie.
    pub async fn get_with_cookie(&self, path: &str, name: &str, token: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(header::COOKIE, format!("{}={}", name, token))
            .send()
            .await
            .expect("GET request failed")
    }

    /// `POST path` with a JSON body.
    pub async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// `POST /auth/login` with a JSON body.
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post_json(
            "/auth/login",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Logs in and returns the JSON body, asserting success.
    pub async fn login_ok(&self, username: &str, password: &str) -> Value {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), 200, "login of {} failed", username);
        response.json().await.expect("login body is JSON")
    }

    /// `POST /auth/refresh`.
    pub async fn refresh(&self, refresh_token: &str) -> Response {
        self.post_json("/auth/refresh", json!({ "refresh_token": refresh_token }))
            .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

/// Returns the raw `Set-Cookie` header for a cookie name.
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_string)
}

/// Returns the value of a `Set-Cookie` header (`name=value; ...`).
pub fn cookie_value(set_cookie: &str) -> Option<&str> {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value)
}

/// Returns the error code of an error body.
pub async fn error_code(response: Response) -> String {
    let body: Value = response.json().await.expect("error body is JSON");
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}

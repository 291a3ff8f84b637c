// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Gate Integration Tests
//!
//! The request gate and auth handlers over real HTTP.
//!
//! ## Test Categories
//!
//! - `test_login_*`, `test_refresh_*`, `test_logoff_*`: Auth routes
//! - `test_gate_*`: Token extraction, verification and rules
//! - `test_cookie_*`: Cookie transport

use std::sync::Arc;

use axum::{routing::get, Json};
use jwtgate_api::{
    getter_fn, rule_fn, AuthServer, Claims, QueryTokenGetter, RoutePolicy, ServerConfig,
};
use jwtgate_core::{AuthError, BoxError};
use jwtgate_tests::prelude::*;
use serde_json::{json, Value};

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    init_test_logging();
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let body = server.login_ok(TEST_USER, TEST_PASSWORD).await;

    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["token_data"]["username"], TEST_USER);
    assert_eq!(body["token_data"]["user_data"]["role"], "admin");
    assert!(body["token_data"]["exp"].as_i64().is_some());
}

#[tokio::test]
async fn test_login_accepts_form_and_alternative_subject_fields() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server
        .client()
        .post(server.url("/auth/login"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(format!("email={}&password={}", "a%40b.com", TEST_PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .post_json("/auth/login", json!({ "login": OTHER_USER, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["token_data"]["username"], OTHER_USER);
}

#[tokio::test]
async fn test_login_missing_credentials() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server.post_json("/auth/login", json!({ "username": TEST_USER })).await;
    assert_eq!(response.status(), 400);

    let response = server.post_json("/auth/login", json!({ "password": TEST_PASSWORD })).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server.login(TEST_USER, "wrong").await;
    assert_eq!(response.status(), 404);
    assert_eq!(error_code(response).await, "NOT_FOUND");

    let response = server.login("nobody@b.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_login_disabled_subject() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    assert_eq!(server.login(DISABLED_USER, TEST_PASSWORD).await.status(), 401);
    assert_eq!(server.login(EMPTY_USER, TEST_PASSWORD).await.status(), 401);
}

#[tokio::test]
async fn test_login_store_failure_is_generic_500() {
    let store = Arc::new(MockSessionStore::with_behavior(SaveBehavior::Fail));
    let manager = AuthFixtures::manager_with(AuthFixtures::config(), store);
    let server = TestServer::start(gated_app(manager)).await;

    let response = server.login(TEST_USER, TEST_PASSWORD).await;
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(!body.to_string().contains("backend is down"));
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;
    let login = server.login_ok(TEST_USER, TEST_PASSWORD).await;
    let first = login["refresh_token"].as_str().unwrap();

    let response = server.refresh(first).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let second = body["refresh_token"].as_str().unwrap();

    assert_ne!(first, second);
    assert_eq!(body["token_data"]["username"], TEST_USER);
    assert!(body["access_token"].as_str().is_some());

    assert_eq!(server.refresh(first).await.status(), 401);
    assert_eq!(server.refresh(second).await.status(), 200);
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server.refresh("never-issued").await;
    assert_eq!(response.status(), 401);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_missing_token() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    assert_eq!(server.post_json("/auth/refresh", json!({})).await.status(), 400);
    assert_eq!(server.refresh("").await.status(), 400);
}

#[tokio::test]
async fn test_refresh_accepts_expired_access_token() {
    let manager = AuthFixtures::manager();
    let expired = AuthFixtures::expired_token(&manager, TEST_USER);
    let server = TestServer::start(gated_app(manager)).await;
    let login = server.login_ok(TEST_USER, TEST_PASSWORD).await;

    let response = server
        .client()
        .post(server.url("/auth/refresh"))
        .bearer_auth(&expired)
        .json(&json!({ "refresh_token": login["refresh_token"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

// =============================================================================
// Logoff and Me
// =============================================================================

#[tokio::test]
async fn test_logoff_ends_session() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;
    let login = server.login_ok(TEST_USER, TEST_PASSWORD).await;
    let access = login["access_token"].as_str().unwrap();

    let response = server.get_with_token("/auth/logoff", access).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "success": true }));

    let refresh = login["refresh_token"].as_str().unwrap();
    assert_eq!(server.refresh(refresh).await.status(), 401);

    // No session left, still a success.
    assert_eq!(server.get_with_token("/auth/logoff", access).await.status(), 200);
}

#[tokio::test]
async fn test_logoff_accepts_expired_token() {
    let manager = AuthFixtures::manager();
    let expired = AuthFixtures::expired_token(&manager, TEST_USER);
    let server = TestServer::start(gated_app(manager)).await;
    let login = server.login_ok(TEST_USER, TEST_PASSWORD).await;

    assert_eq!(server.get_with_token("/auth/logoff", &expired).await.status(), 200);
    assert_eq!(
        server.refresh(login["refresh_token"].as_str().unwrap()).await.status(),
        401
    );
}

#[tokio::test]
async fn test_logoff_requires_authentication() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    assert_eq!(server.get("/auth/logoff").await.status(), 401);
    assert_eq!(
        server
            .get_with_token("/auth/logoff", &AuthFixtures::foreign_token())
            .await
            .status(),
        401
    );
}

#[tokio::test]
async fn test_me_returns_claims() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;
    let login = server.login_ok(TEST_USER, TEST_PASSWORD).await;

    let response = server
        .get_with_token("/auth/me", login["access_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), login["token_data"]);
}

// =============================================================================
// Gate
// =============================================================================

#[tokio::test]
async fn test_gate_protected_route() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;
    let login = server.login_ok(TEST_USER, TEST_PASSWORD).await;

    let response = server
        .get_with_token("/api/message", login["access_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap()["username"], TEST_USER);
}

#[tokio::test]
async fn test_gate_requires_token_on_protected_route() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server.get("/api/message").await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Authentication required");
}

#[tokio::test]
async fn test_gate_rejects_expired_token_on_protected_route() {
    let manager = AuthFixtures::manager();
    let expired = AuthFixtures::expired_token(&manager, TEST_USER);
    let server = TestServer::start(gated_app(manager)).await;

    let response = server.get_with_token("/api/message", &expired).await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Invalid or outdated access token");
}

#[tokio::test]
async fn test_gate_soft_route() {
    let manager = AuthFixtures::manager();
    let expired = AuthFixtures::expired_token(&manager, TEST_USER);
    let server = TestServer::start(gated_app(manager)).await;
    let login = server.login_ok(OTHER_USER, TEST_PASSWORD).await;

    let anonymous: Value = server.get("/api/public").await.json().await.unwrap();
    assert_eq!(anonymous["username"], Value::Null);

    let response = server.get_with_token("/api/public", &expired).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap()["username"], Value::Null);

    let known: Value = server
        .get_with_token("/api/public", login["access_token"].as_str().unwrap())
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(known["username"], OTHER_USER);
}

#[tokio::test]
async fn test_gate_non_bearer_scheme_is_no_token() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server
        .client()
        .get(server.url("/api/public"))
        .header("authorization", "Basic YTpi")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_gate_malformed_authorization_header() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;

    let response = server
        .client()
        .get(server.url("/api/public"))
        .header("authorization", "Bearer")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(error_code(response).await, "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_gate_rule_denies() {
    let server = TestServer::start(gated_app(AuthFixtures::manager())).await;
    let admin = server.login_ok(TEST_USER, TEST_PASSWORD).await;
    let user = server.login_ok(OTHER_USER, TEST_PASSWORD).await;

    let response = server
        .get_with_token("/api/admin", admin["access_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status(), 200);

    let response = server
        .get_with_token("/api/admin", user["access_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Insufficient access rights");
}

#[tokio::test]
async fn test_gate_rules_short_circuit_in_order() {
    let manager = AuthFixtures::manager();
    let token = manager.create_tokens(TEST_USER).await.unwrap().access_token;

    let allow = CountingRule::allow();
    let deny = CountingRule::deny();
    let never = CountingRule::allow();

    let app = gated_router(manager)
        .route(
            "/api/ordered",
            get(|| async { "ok" }),
            RoutePolicy::authenticated()
                .rule(allow.clone())
                .rule(deny.clone())
                .rule(never.clone()),
        )
        .into_router();
    let server = TestServer::start(app).await;

    assert_eq!(server.get_with_token("/api/ordered", &token).await.status(), 403);
    assert_eq!((allow.calls(), deny.calls(), never.calls()), (1, 1, 0));

    // Rules never run without a verified token.
    assert_eq!(server.get("/api/ordered").await.status(), 401);
    assert_eq!(allow.calls(), 1);
}

#[tokio::test]
async fn test_gate_rule_error_does_not_leak() {
    let manager = AuthFixtures::manager();
    let token = manager.create_tokens(TEST_USER).await.unwrap().access_token;

    let app = gated_router(manager)
        .route(
            "/api/broken",
            get(|| async { "ok" }),
            RoutePolicy::authenticated().rule(CountingRule::fail("database password is hunter2")),
        )
        .into_router();
    let server = TestServer::start(app).await;

    let response = server.get_with_token("/api/broken", &token).await;
    assert_eq!(response.status(), 500);
    let text = response.text().await.unwrap();
    assert!(!text.contains("hunter2"));

    // The server keeps serving.
    assert_eq!(server.get("/api/public").await.status(), 200);
}

#[tokio::test]
async fn test_gate_custom_query_getter() {
    let manager = AuthFixtures::manager();
    let token = manager.create_tokens(TEST_USER).await.unwrap().access_token;

    let app = gated_router(manager)
        .with_token_getter(QueryTokenGetter::new("access_token"))
        .into_router();
    let server = TestServer::start(app).await;

    let response = server
        .get(&format!("/api/message?access_token={}", token))
        .await;
    assert_eq!(response.status(), 200);

    // The bearer header is no longer consulted.
    assert_eq!(server.get_with_token("/api/message", &token).await.status(), 401);
}

#[tokio::test]
async fn test_gate_failing_getter_is_500() {
    let app = gated_router(AuthFixtures::manager())
        .with_token_getter(getter_fn(|_| Err(BoxError::from("token vault offline"))))
        .into_router();
    let server = TestServer::start(app).await;

    let response = server.get("/api/public").await;
    assert_eq!(response.status(), 500);
    assert!(!response.text().await.unwrap().contains("vault"));
}

#[tokio::test]
async fn test_gate_panicking_rule_is_500() {
    let manager = AuthFixtures::manager();
    let token = manager.create_tokens(TEST_USER).await.unwrap().access_token;

    let app = gated_router(manager)
        .route(
            "/api/panics",
            get(|| async { "ok" }),
            RoutePolicy::authenticated().rule(rule_fn(|_| -> Result<bool, BoxError> {
                panic!("rule state is corrupted")
            })),
        )
        .into_router();
    let server = TestServer::start(AuthServer::new(ServerConfig::default(), app).router()).await;

    let response = server.get_with_token("/api/panics", &token).await;
    assert_eq!(response.status(), 500);
    assert_eq!(error_code(response).await, "INTERNAL_ERROR");

    // The connection survives and other routes still answer.
    assert_eq!(server.get_with_token("/api/message", &token).await.status(), 200);
}

#[tokio::test]
async fn test_gate_panicking_getter_is_500() {
    let app = gated_router(AuthFixtures::manager())
        .with_token_getter(getter_fn(|_| -> Result<Option<String>, BoxError> {
            panic!("token vault offline")
        }))
        .into_router();
    let server = TestServer::start(AuthServer::new(ServerConfig::default(), app).router()).await;

    let response = server.get("/api/public").await;
    assert_eq!(response.status(), 500);
    assert!(!response.text().await.unwrap().contains("vault"));
}

#[tokio::test]
async fn test_gate_extra_route_gets_manager_and_claims() {
    async fn subject_and_ttl(
        jwtgate_api::Manager(manager): jwtgate_api::Manager,
        Claims(claims): Claims,
    ) -> Json<Value> {
        Json(json!({
            "subject": claims.subject,
            "ttl": manager.access_token_ttl().as_secs(),
        }))
    }

    let manager = AuthFixtures::manager();
    let token = manager.create_tokens(TEST_USER).await.unwrap().access_token;
    let app = gated_router(manager)
        .route("/api/ttl", get(subject_and_ttl), RoutePolicy::authenticated())
        .into_router();
    let server = TestServer::start(app).await;

    let body: Value = server.get_with_token("/api/ttl", &token).await.json().await.unwrap();
    assert_eq!(body, json!({ "subject": TEST_USER, "ttl": 300 }));
}

// =============================================================================
// Cookie Transport
// =============================================================================

#[tokio::test]
async fn test_cookie_login_sets_http_only_cookie() {
    let server = TestServer::start(gated_app(AuthFixtures::cookie_manager())).await;

    let response = server.login(TEST_USER, TEST_PASSWORD).await;
    assert_eq!(response.status(), 200);

    let cookie = set_cookie(&response, COOKIE_NAME).expect("login sets the cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie_value(&cookie).unwrap().is_empty());

    let body: Value = response.json().await.unwrap();
    assert!(body.get("access_token").is_none());
    assert!(body["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn test_cookie_authenticates_and_is_refreshed() {
    let server = TestServer::start(gated_app(AuthFixtures::cookie_manager())).await;
    let response = server.login(TEST_USER, TEST_PASSWORD).await;
    let cookie = set_cookie(&response, COOKIE_NAME).unwrap();
    let token = cookie_value(&cookie).unwrap().to_string();

    let response = server.get_with_cookie("/api/message", COOKIE_NAME, &token).await;
    assert_eq!(response.status(), 200);

    let echoed = set_cookie(&response, COOKIE_NAME).expect("verified request re-sets the cookie");
    assert_eq!(cookie_value(&echoed), Some(token.as_str()));
}

#[tokio::test]
async fn test_cookie_takes_precedence_over_header() {
    let server = TestServer::start(gated_app(AuthFixtures::cookie_manager())).await;
    let response = server.login(TEST_USER, TEST_PASSWORD).await;
    let cookie = set_cookie(&response, COOKIE_NAME).unwrap();
    let token = cookie_value(&cookie).unwrap().to_string();

    let response = server
        .client()
        .get(server.url("/api/message"))
        .header("cookie", format!("{}={}", COOKIE_NAME, token))
        .header("authorization", "Bearer")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_cookie_refresh_sets_new_cookie() {
    let server = TestServer::start(gated_app(AuthFixtures::cookie_manager())).await;
    let login = server.login(TEST_USER, TEST_PASSWORD).await;
    let first = set_cookie(&login, COOKIE_NAME).unwrap();
    let body: Value = login.json().await.unwrap();

    // Distinct iat/exp so the new access token differs.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let response = server.refresh(body["refresh_token"].as_str().unwrap()).await;
    assert_eq!(response.status(), 200);
    let second = set_cookie(&response, COOKIE_NAME).expect("refresh sets the cookie");
    assert_ne!(cookie_value(&first), cookie_value(&second));
}

#[tokio::test]
async fn test_cookie_logoff_with_expired_token_clears_cookie() {
    let manager = AuthFixtures::cookie_manager();
    let expired = AuthFixtures::expired_token(&manager, TEST_USER);
    let server = TestServer::start(gated_app(manager)).await;

    let response = server.get_with_cookie("/auth/logoff", COOKIE_NAME, &expired).await;
    assert_eq!(response.status(), 200);

    let cookie = set_cookie(&response, COOKIE_NAME).expect("logoff clears the cookie");
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(cookie_value(&cookie), Some(""));
}

#[tokio::test]
async fn test_cookie_expired_on_protected_route() {
    let manager = AuthFixtures::cookie_manager();
    let expired = AuthFixtures::expired_token(&manager, TEST_USER);
    let server = TestServer::start(gated_app(manager)).await;

    let response = server.get_with_cookie("/api/message", COOKIE_NAME, &expired).await;
    assert_eq!(response.status(), 401);
}

// =============================================================================
// Error Mapping
// =============================================================================

#[test]
fn test_error_status_codes() {
    let cases = [
        (AuthError::BadCredentials, 404),
        (AuthError::MissingCredentials, 400),
        (AuthError::MissingRefreshToken, 400),
        (AuthError::invalid_subject("disabled"), 401),
        (AuthError::invalid_token("expired"), 401),
        (AuthError::InvalidRefreshToken, 401),
        (AuthError::AuthenticationRequired, 401),
        (AuthError::InsufficientRights, 403),
        (AuthError::SessionNotSaved, 500),
        (AuthError::rule("boom"), 500),
    ];

    for (error, status) in cases {
        let api = jwtgate_api::ApiError::from(error);
        assert_eq!(api.status_code().as_u16(), status, "{:?}", api);
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Canonical users, configurations and managers shared by the suites.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jwtgate_core::{AuthConfig, AuthManager, SessionStore, TokenClaims};
use serde_json::{json, Value};

use super::mocks::{MockProvider, MockSessionStore};

/// HMAC secret used by every fixture.
pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-must-be-at-least-32-chars";

/// Enabled user with admin user data.
pub const TEST_USER: &str = "a@b.com";

/// Password of every fixture user.
pub const TEST_PASSWORD: &str = "123456";

/// Enabled user with plain user data.
pub const OTHER_USER: &str = "user@b.com";

/// User whose issuance is refused by the provider.
pub const DISABLED_USER: &str = "disabled@b.com";

/// User whose provider returns `null` user data.
pub const EMPTY_USER: &str = "empty@b.com";

/// Cookie name used in cookie mode fixtures.
pub const COOKIE_NAME: &str = "jwtgate";

// =============================================================================
// AuthFixtures
// =============================================================================

/// Factory for configurations, providers and managers.
pub struct AuthFixtures;

impl AuthFixtures {
    /// Header transport, default TTL.
    pub fn config() -> AuthConfig {
        AuthConfig::new(TEST_SECRET)
    }

    /// Cookie transport under [`COOKIE_NAME`].
    pub fn cookie_config() -> AuthConfig {
        Self::config().with_cookie(COOKIE_NAME)
    }

    /// User data of [`TEST_USER`].
    pub fn admin_data() -> Value {
        json!({ "name": "Alice", "role": "admin" })
    }

    /// Provider with the fixture users.
    pub fn provider() -> MockProvider {
        MockProvider::new()
            .with_user(TEST_USER, TEST_PASSWORD, Self::admin_data())
            .with_user(OTHER_USER, TEST_PASSWORD, json!({ "role": "user" }))
            .with_user(DISABLED_USER, TEST_PASSWORD, json!({}))
            .with_disabled(DISABLED_USER)
            .with_user(EMPTY_USER, TEST_PASSWORD, Value::Null)
    }

    /// Manager with header transport and a fresh store.
    pub fn manager() -> Arc<AuthManager> {
        Self::manager_with(Self::config(), Arc::new(MockSessionStore::new()))
    }

    /// Manager with cookie transport and a fresh store.
    pub fn cookie_manager() -> Arc<AuthManager> {
        Self::manager_with(Self::cookie_config(), Arc::new(MockSessionStore::new()))
    }

    /// Manager over the fixture provider with the given config and store.
    pub fn manager_with(config: AuthConfig, store: Arc<dyn SessionStore>) -> Arc<AuthManager> {
        let manager = AuthManager::new(config, Arc::new(Self::provider()), store)
            .expect("fixture config is valid");
        Arc::new(manager)
    }

    /// A correctly signed access token that expired an hour ago.
    pub fn expired_token(manager: &AuthManager, subject: &str) -> String {
        let claims = manager
            .codec()
            .claims_for(subject, Self::admin_data())
            .with_expires_at(Utc::now() - ChronoDuration::hours(1));
        manager.codec().encode(&claims).expect("encode expired token")
    }

    /// A token for [`TEST_USER`] signed with a different secret.
    pub fn foreign_token() -> String {
        let config = AuthConfig::new("another-secret-that-is-also-32-bytes-long");
        let codec = jwtgate_core::TokenCodec::new(&config).expect("valid config");
        let claims: TokenClaims = codec.claims_for(TEST_USER, Self::admin_data());
        codec.encode(&claims).expect("encode foreign token")
    }
}

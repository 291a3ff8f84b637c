// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Core Integration Tests
//!
//! Token lifecycle through [`AuthManager`] with mock collaborators.
//!
//! ## Test Categories
//!
//! - `test_codec_*`: Signing, verification and expiry
//! - `test_issue_*`: Token pair issuance
//! - `test_session_*`: Refresh, rotation and logoff

use std::sync::Arc;
use std::time::Duration;

use jwtgate_core::{AuthError, AuthManager, SessionStore, TokenClaims};
use jwtgate_tests::prelude::*;
use serde_json::json;

// =============================================================================
// Codec Tests
// =============================================================================

#[tokio::test]
async fn test_codec_round_trip() {
    let manager = AuthFixtures::manager();
    let claims = manager.codec().claims_for(TEST_USER, AuthFixtures::admin_data());

    let token = manager.codec().encode(&claims).unwrap();
    assert_eq!(token.split('.').count(), 3);

    let decoded = manager.decode_token(&token, true).unwrap();
    assert_eq!(decoded, claims);
}

#[tokio::test]
async fn test_codec_expiry_toggle() {
    let manager = AuthFixtures::manager();
    let token = AuthFixtures::expired_token(&manager, TEST_USER);

    assert!(matches!(
        manager.decode_token(&token, true),
        Err(AuthError::InvalidToken { .. })
    ));

    let claims = manager.decode_token(&token, false).unwrap();
    assert_eq!(claims.subject, TEST_USER);
    assert!(claims.is_expired());
}

#[tokio::test]
async fn test_codec_rejects_foreign_signature_even_without_expiry() {
    let manager = AuthFixtures::manager();
    let token = AuthFixtures::foreign_token();

    assert!(manager.decode_token(&token, true).is_err());
    assert!(manager.decode_token(&token, false).is_err());
}

#[tokio::test]
async fn test_codec_rejects_garbage() {
    let manager = AuthFixtures::manager();

    for token in ["", "abc", "a.b.c", "only.two"] {
        assert!(
            matches!(manager.decode_token(token, false), Err(AuthError::InvalidToken { .. })),
            "token {:?} should be rejected",
            token
        );
    }
}

#[tokio::test]
async fn test_codec_leeway_accepts_recent_expiry() {
    let config = AuthFixtures::config().with_leeway(Duration::from_secs(7200));
    let manager = AuthFixtures::manager_with(config, Arc::new(MockSessionStore::new()));
    let token = AuthFixtures::expired_token(&manager, TEST_USER);

    assert!(manager.decode_token(&token, true).is_ok());
}

// =============================================================================
// Issuance Tests
// =============================================================================

#[tokio::test]
async fn test_issue_token_pair() {
    init_test_logging();
    let store = Arc::new(MockSessionStore::new());
    let manager = AuthFixtures::manager_with(AuthFixtures::config(), store.clone());

    let pair = manager.create_tokens(TEST_USER).await.unwrap();

    assert_eq!(pair.claims.subject, TEST_USER);
    assert_eq!(pair.claims.user_data, AuthFixtures::admin_data());
    assert!(!pair.refresh_token.is_empty());
    assert_eq!(store.token_of(TEST_USER).as_deref(), Some(pair.refresh_token.as_str()));

    let decoded = manager.decode_token(&pair.access_token, true).unwrap();
    assert_eq!(decoded, pair.claims);

    let remaining = decoded.time_until_expiration().unwrap();
    assert!(remaining <= manager.access_token_ttl());
    assert!(remaining > manager.access_token_ttl() - Duration::from_secs(5));
}

#[tokio::test]
async fn test_issue_refuses_disabled_and_empty_subjects() {
    let manager = AuthFixtures::manager();

    assert!(matches!(
        manager.create_tokens(DISABLED_USER).await,
        Err(AuthError::InvalidSubject { .. })
    ));

    match manager.create_tokens(EMPTY_USER).await {
        Err(AuthError::InvalidSubject { message }) => {
            assert_eq!(message, "cannot create token data")
        }
        other => panic!("expected InvalidSubject, got {:?}", other.map(|p| p.claims)),
    }
}

#[tokio::test]
async fn test_issue_fails_when_store_refuses() {
    let store = Arc::new(MockSessionStore::with_behavior(SaveBehavior::Refuse));
    let manager = AuthFixtures::manager_with(AuthFixtures::config(), store.clone());

    let result = manager.create_tokens(TEST_USER).await;

    assert!(matches!(result, Err(AuthError::SessionNotSaved)));
    assert_eq!(store.saves(), 1);
    assert!(store.token_of(TEST_USER).is_none());
}

#[tokio::test]
async fn test_issue_propagates_store_failure() {
    let store = Arc::new(MockSessionStore::with_behavior(SaveBehavior::Fail));
    let manager = AuthFixtures::manager_with(AuthFixtures::config(), store);

    let err = manager.create_tokens(TEST_USER).await.unwrap_err();
    assert!(matches!(err, AuthError::Store(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_issue_for_prebuilt_claims_keeps_expiry() {
    let manager = AuthFixtures::manager();
    let claims = TokenClaims::new(TEST_USER, json!({"scope": "custom"}), Duration::from_secs(30));
    let exp = claims.exp;

    let pair = manager.create_tokens_for(claims).await.unwrap();

    assert_eq!(pair.claims.exp, exp);
    assert_eq!(manager.decode_token(&pair.access_token, true).unwrap().exp, exp);
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_session_second_issuance_invalidates_first() {
    let manager = AuthFixtures::manager();

    let first = manager.create_tokens(TEST_USER).await.unwrap();
    let second = manager.create_tokens(TEST_USER).await.unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(manager.check_refresh_token(&first.refresh_token).await.unwrap(), None);
    assert_eq!(
        manager.check_refresh_token(&second.refresh_token).await.unwrap().as_deref(),
        Some(TEST_USER)
    );
}

#[tokio::test]
async fn test_session_refresh_rotates() {
    let manager = AuthFixtures::manager();
    let pair = manager.create_tokens(TEST_USER).await.unwrap();

    let rotated = manager.refresh_tokens(&pair.refresh_token).await.unwrap();

    assert_eq!(rotated.claims.subject, TEST_USER);
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert!(matches!(
        manager.refresh_tokens(&pair.refresh_token).await,
        Err(AuthError::InvalidRefreshToken)
    ));
    assert!(manager.refresh_tokens(&rotated.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_session_unknown_refresh_token() {
    let manager = AuthFixtures::manager();

    let err = manager.refresh_tokens("never-issued").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidRefreshToken));
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_session_logoff_is_idempotent() {
    let store = Arc::new(MockSessionStore::new());
    let manager = AuthFixtures::manager_with(AuthFixtures::config(), store.clone());
    let pair = manager.create_tokens(TEST_USER).await.unwrap();

    assert!(manager.reset_refresh_token(TEST_USER).await.unwrap());
    assert!(!manager.reset_refresh_token(TEST_USER).await.unwrap());
    assert!(!manager.reset_refresh_token("nobody@b.com").await.unwrap());
    assert_eq!(store.resets(), 3);

    assert_eq!(manager.check_refresh_token(&pair.refresh_token).await.unwrap(), None);
}

#[tokio::test]
async fn test_session_subjects_are_independent() {
    let manager = AuthFixtures::manager();

    let admin = manager.create_tokens(TEST_USER).await.unwrap();
    let user = manager.create_tokens(OTHER_USER).await.unwrap();
    manager.reset_refresh_token(OTHER_USER).await.unwrap();

    assert_eq!(
        manager.check_refresh_token(&admin.refresh_token).await.unwrap().as_deref(),
        Some(TEST_USER)
    );
    assert_eq!(manager.check_refresh_token(&user.refresh_token).await.unwrap(), None);
}

#[tokio::test]
async fn test_session_concurrent_issuance_leaves_one_live_token() {
    let store = Arc::new(MockSessionStore::new());
    let manager: Arc<AuthManager> =
        AuthFixtures::manager_with(AuthFixtures::config(), store.clone());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.create_tokens(TEST_USER).await.unwrap() })
        })
        .collect();

    let mut pairs = Vec::new();
    for task in tasks {
        pairs.push(task.await.unwrap());
    }

    let mut live = 0;
    for pair in &pairs {
        if manager.check_refresh_token(&pair.refresh_token).await.unwrap().is_some() {
            live += 1;
        }
    }
    assert_eq!(live, 1);
    assert!(store.check_refresh_token(&store.token_of(TEST_USER).unwrap()).await.unwrap().is_some());
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Test doubles for the capability seams: [`AuthProvider`], [`SessionStore`]
//! and [`AuthorizationRule`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use http::request::Parts;
use jwtgate_api::AuthorizationRule;
use jwtgate_core::{
    AuthError, AuthProvider, AuthResult, BoxError, MemorySessionStore, SessionStore, StoreError,
    StoreResult, UserData,
};
use serde_json::Value;

// =============================================================================
// MockProvider
// =============================================================================

/// In-memory provider with plaintext passwords.
#[derive(Debug, Default)]
pub struct MockProvider {
    users: HashMap<String, (String, UserData)>,
    disabled: HashSet<String>,
    credential_checks: AtomicUsize,
}

impl MockProvider {
    /// Creates a provider without users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user.
    pub fn with_user(
        mut self,
        subject: impl Into<String>,
        password: impl Into<String>,
        user_data: UserData,
    ) -> Self {
        self.users.insert(subject.into(), (password.into(), user_data));
        self
    }

    /// Marks a user as disabled: the password check passes, issuance fails.
    pub fn with_disabled(mut self, subject: impl Into<String>) -> Self {
        self.disabled.insert(subject.into());
        self
    }

    /// Number of `check_credential` calls so far.
    pub fn credential_checks(&self) -> usize {
        self.credential_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for MockProvider {
    async fn check_credential(&self, subject: &str, secret: &str) -> bool {
        self.credential_checks.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(subject)
            .is_some_and(|(password, _)| password == secret)
    }

    async fn create_user_data(&self, subject: &str) -> AuthResult<UserData> {
        if self.disabled.contains(subject) {
            return Err(AuthError::invalid_subject("subject is disabled"));
        }
        self.users
            .get(subject)
            .map(|(_, user_data)| user_data.clone())
            .ok_or_else(|| AuthError::invalid_subject("unknown subject"))
    }
}

// =============================================================================
// MockSessionStore
// =============================================================================

/// How a [`MockSessionStore`] answers saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveBehavior {
    /// Delegate to a [`MemorySessionStore`].
    #[default]
    Persist,
    /// Report "not persisted".
    Refuse,
    /// Report a backend failure.
    Fail,
}

/// [`MemorySessionStore`] with injectable save failures and call counters.
#[derive(Debug, Default)]
pub struct MockSessionStore {
    inner: MemorySessionStore,
    behavior: SaveBehavior,
    saves: AtomicUsize,
    resets: AtomicUsize,
}

impl MockSessionStore {
    /// Creates a store that persists normally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given save behavior.
    pub fn with_behavior(behavior: SaveBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Number of save attempts.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of reset calls.
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Current refresh token of a subject.
    pub fn token_of(&self, subject: &str) -> Option<String> {
        self.inner.token_of(subject)
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn save_refresh_token(&self, subject: &str, refresh_token: &str) -> StoreResult<bool> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            SaveBehavior::Persist => self.inner.save_refresh_token(subject, refresh_token).await,
            SaveBehavior::Refuse => Ok(false),
            SaveBehavior::Fail => Err(StoreError::unavailable("session backend is down")),
        }
    }

    async fn check_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<String>> {
        self.inner.check_refresh_token(refresh_token).await
    }

    async fn reset_refresh_token(&self, subject: &str) -> StoreResult<bool> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.inner.reset_refresh_token(subject).await
    }
}

// =============================================================================
// CountingRule
// =============================================================================

/// Rule with a fixed outcome that counts its evaluations.
#[derive(Debug, Clone)]
pub struct CountingRule {
    outcome: Result<bool, &'static str>,
    calls: Arc<AtomicUsize>,
}

impl CountingRule {
    /// Always grants.
    pub fn allow() -> Self {
        Self::with_outcome(Ok(true))
    }

    /// Always denies.
    pub fn deny() -> Self {
        Self::with_outcome(Ok(false))
    }

    /// Always fails with the given message.
    pub fn fail(message: &'static str) -> Self {
        Self::with_outcome(Err(message))
    }

    fn with_outcome(outcome: Result<bool, &'static str>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of evaluations, shared between clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationRule for CountingRule {
    async fn check(&self, _parts: &Parts) -> Result<bool, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.map_err(BoxError::from)
    }
}

/// Returns `user_data` as a JSON object for fixtures.
pub fn user_data(pairs: &[(&str, &str)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect(),
    )
}

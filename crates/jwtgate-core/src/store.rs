// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Refresh token persistence.
//!
//! A session is the pairing `subject -> current refresh token`. The engine
//! never locks around session updates itself; a [`SessionStore`] must make
//! concurrent updates for the same subject linearizable (last writer wins,
//! no torn reads from [`check_refresh_token`](SessionStore::check_refresh_token)).

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreResult;

// =============================================================================
// SessionStore
// =============================================================================

/// Persistence contract for refresh tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `refresh_token` as the only live token for `subject`.
    ///
    /// Returns `Ok(false)` if the token was not persisted.
    async fn save_refresh_token(&self, subject: &str, refresh_token: &str) -> StoreResult<bool>;

    /// Resolves a refresh token to its subject. Must not mutate state.
    async fn check_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<String>>;

    /// Ends the session of `subject`.
    ///
    /// Returns `Ok(false)` if the subject had no session.
    async fn reset_refresh_token(&self, subject: &str) -> StoreResult<bool>;
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[derive(Debug, Default)]
struct Sessions {
    by_subject: HashMap<String, String>,
    by_token: HashMap<String, String>,
}

/// In-process session store.
///
/// Both indexes live under one lock, so a rotation replaces the old token and
/// publishes the new one in a single step.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Sessions>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().by_subject.len()
    }

    /// Returns `true` if no session is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the live refresh token of a subject.
    pub fn token_of(&self, subject: &str) -> Option<String> {
        self.sessions.read().by_subject.get(subject).cloned()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_refresh_token(&self, subject: &str, refresh_token: &str) -> StoreResult<bool> {
        let mut sessions = self.sessions.write();

        if let Some(previous) = sessions
            .by_subject
            .insert(subject.to_string(), refresh_token.to_string())
        {
            sessions.by_token.remove(&previous);
        }
        sessions
            .by_token
            .insert(refresh_token.to_string(), subject.to_string());

        Ok(true)
    }

    async fn check_refresh_token(&self, refresh_token: &str) -> StoreResult<Option<String>> {
        Ok(self.sessions.read().by_token.get(refresh_token).cloned())
    }

    async fn reset_refresh_token(&self, subject: &str) -> StoreResult<bool> {
        let mut sessions = self.sessions.write();

        match sessions.by_subject.remove(subject) {
            Some(token) => {
                sessions.by_token.remove(&token);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

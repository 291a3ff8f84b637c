// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims structure.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque user data embedded in the claims.
///
/// Produced by [`AuthProvider::create_user_data`](crate::AuthProvider::create_user_data).
/// A JSON `null` means the provider had nothing to embed.
pub type UserData = serde_json::Value;

/// Claims signed into every access token.
///
/// Serialized as `{"username", "user_data", "exp", "iat"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject the token was issued to.
    #[serde(rename = "username")]
    pub subject: String,

    /// Provider-built user data.
    #[serde(default)]
    pub user_data: UserData,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Creates claims for a subject that expire `ttl` from now.
    pub fn new(subject: impl Into<String>, user_data: UserData, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            subject: subject.into(),
            user_data,
            exp: now.saturating_add(ttl),
            iat: Some(now),
        }
    }

    /// Overrides the expiration time.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.exp = expires_at.timestamp();
        self
    }

    /// Returns the subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns a user data field, if the user data is an object holding it.
    pub fn user_data_field(&self, key: &str) -> Option<&serde_json::Value> {
        self.user_data.get(key)
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Returns the time remaining until expiration.
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::from_secs((self.exp - now) as u64))
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

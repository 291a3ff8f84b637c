// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization predicates evaluated by the gate.
//!
//! Rules run after the access token has been verified, so the request
//! extensions already hold the [`TokenClaims`]. A rule answers `Ok(true)` to
//! let the request through, `Ok(false)` to reject it with 403, and `Err` when
//! it could not decide (500, cause logged).

use std::collections::HashSet;

use async_trait::async_trait;
use http::request::Parts;
use jwtgate_core::{BoxError, TokenClaims};
use serde_json::Value;

/// A single authorization predicate.
#[async_trait]
pub trait AuthorizationRule: Send + Sync {
    /// Decides whether the request may proceed.
    async fn check(&self, parts: &Parts) -> Result<bool, BoxError>;
}

/// Returns the verified claims attached to the request.
pub fn claims_of(parts: &Parts) -> Option<&TokenClaims> {
    parts.extensions.get::<TokenClaims>()
}

// =============================================================================
// FnRule
// =============================================================================

/// Adapts a synchronous closure into an [`AuthorizationRule`].
pub struct FnRule<F> {
    f: F,
}

#[async_trait]
impl<F> AuthorizationRule for FnRule<F>
where
    F: Fn(&Parts) -> Result<bool, BoxError> + Send + Sync,
{
    async fn check(&self, parts: &Parts) -> Result<bool, BoxError> {
        (self.f)(parts)
    }
}

/// Creates an [`AuthorizationRule`] from a closure.
///
/// ```rust,ignore
/// let admin_only = rule_fn(|parts| {
///     Ok(claims_of(parts).and_then(|c| c.user_data_field("role")) == Some(&json!("admin")))
/// });
/// ```
pub fn rule_fn<F>(f: F) -> FnRule<F>
where
    F: Fn(&Parts) -> Result<bool, BoxError> + Send + Sync,
{
    FnRule { f }
}

// =============================================================================
// RequireUserData
// =============================================================================

/// Requires `user_data[key] == value` in the verified claims.
#[derive(Debug, Clone)]
pub struct RequireUserData {
    key: String,
    value: Value,
}

impl RequireUserData {
    /// Creates the rule.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl AuthorizationRule for RequireUserData {
    async fn check(&self, parts: &Parts) -> Result<bool, BoxError> {
        Ok(claims_of(parts)
            .and_then(|claims| claims.user_data_field(&self.key))
            .is_some_and(|value| *value == self.value))
    }
}

// =============================================================================
// RequireSubject
// =============================================================================

/// Requires the claims' subject to be in an allow-list.
#[derive(Debug, Clone)]
pub struct RequireSubject {
    subjects: HashSet<String>,
}

impl RequireSubject {
    /// Creates the rule.
    pub fn new<I, T>(subjects: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            subjects: subjects.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl AuthorizationRule for RequireSubject {
    async fn check(&self, parts: &Parts) -> Result<bool, BoxError> {
        Ok(claims_of(parts).is_some_and(|claims| self.subjects.contains(claims.subject())))
    }
}

// =============================================================================
// Tests
// =============================================================================

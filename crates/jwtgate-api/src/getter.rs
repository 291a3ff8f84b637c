// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access token extraction from requests.
//!
//! The gate consults the configured cookie first (cookie mode) and falls back
//! to a [`TokenGetter`]. A getter returns `Ok(None)` when the request simply
//! carries no token and `Err` when the request is malformed; the gate turns
//! the latter into an internal error.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::Query;
use http::header::{HeaderName, AUTHORIZATION};
use http::request::Parts;
use http::HeaderMap;
use jwtgate_core::BoxError;

/// Pulls a candidate access token out of a request.
#[async_trait]
pub trait TokenGetter: Send + Sync {
    /// Returns the token carried by the request, if any.
    async fn get_token(&self, parts: &Parts) -> Result<Option<String>, BoxError>;
}

// =============================================================================
// BearerTokenGetter
// =============================================================================

/// Reads `Authorization: Bearer <token>`. The default getter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerTokenGetter;

#[async_trait]
impl TokenGetter for BearerTokenGetter {
    async fn get_token(&self, parts: &Parts) -> Result<Option<String>, BoxError> {
        bearer_token(&parts.headers)
    }
}

/// Parses the `Authorization` header.
///
/// A missing header or a non-bearer scheme yields `Ok(None)`. A header that is
/// not UTF-8 or has no `<scheme> <credentials>` shape is an error.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, BoxError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| "authorization header is not valid UTF-8")?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or("malformed authorization header")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

// =============================================================================
// HeaderTokenGetter
// =============================================================================

/// Reads the raw token from a custom header.
#[derive(Debug, Clone)]
pub struct HeaderTokenGetter {
    name: HeaderName,
}

impl HeaderTokenGetter {
    /// Creates a getter for the given header.
    pub fn new(name: HeaderName) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TokenGetter for HeaderTokenGetter {
    async fn get_token(&self, parts: &Parts) -> Result<Option<String>, BoxError> {
        let Some(value) = parts.headers.get(&self.name) else {
            return Ok(None);
        };

        let token = value.to_str()?.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }
}

// =============================================================================
// QueryTokenGetter
// =============================================================================

/// Reads the token from a query string parameter.
#[derive(Debug, Clone)]
pub struct QueryTokenGetter {
    param: String,
}

impl QueryTokenGetter {
    /// Creates a getter for the given query parameter.
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

#[async_trait]
impl TokenGetter for QueryTokenGetter {
    async fn get_token(&self, parts: &Parts) -> Result<Option<String>, BoxError> {
        if parts.uri.query().is_none() {
            return Ok(None);
        }

        let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)?;
        Ok(params.remove(&self.param).filter(|token| !token.is_empty()))
    }
}

// =============================================================================
// FnTokenGetter
// =============================================================================

/// Adapts a synchronous closure into a [`TokenGetter`].
pub struct FnTokenGetter<F> {
    f: F,
}

#[async_trait]
impl<F> TokenGetter for FnTokenGetter<F>
where
    F: Fn(&Parts) -> Result<Option<String>, BoxError> + Send + Sync,
{
    async fn get_token(&self, parts: &Parts) -> Result<Option<String>, BoxError> {
        (self.f)(parts)
    }
}

/// Creates a [`TokenGetter`] from a closure.
pub fn getter_fn<F>(f: F) -> FnTokenGetter<F>
where
    F: Fn(&Parts) -> Result<Option<String>, BoxError> + Send + Sync,
{
    FnTokenGetter { f }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for gated handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts, Request},
    Form, Json,
};
use jwtgate_core::{AuthError, AuthManager, TokenClaims};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

// =============================================================================
// Claims Extractor
// =============================================================================

/// Extractor for verified claims.
///
/// Returns 401 if the gate attached no claims to the request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Claims(claims): Claims) -> impl IntoResponse {
///     format!("Hello, {}", claims.subject)
/// }
/// ```
pub struct Claims(pub TokenClaims);

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(Claims)
            .ok_or_else(|| AuthError::AuthenticationRequired.into())
    }
}

// =============================================================================
// Optional Claims Extractor
// =============================================================================

/// Extractor for soft-authenticated routes.
pub struct MaybeClaims(pub Option<TokenClaims>);

impl<S> FromRequestParts<S> for MaybeClaims
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeClaims(parts.extensions.get::<TokenClaims>().cloned()))
    }
}

// =============================================================================
// Manager Extractor
// =============================================================================

/// Extractor for the [`AuthManager`] the gate attached to the request.
///
/// Fails with 500 on a route that is not behind a gate.
pub struct Manager(pub Arc<AuthManager>);

impl<S> FromRequestParts<S> for Manager
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<AuthManager>>()
            .cloned()
            .map(Manager)
            .ok_or_else(|| ApiError::internal("route is not behind an auth gate"))
    }
}

// =============================================================================
// JSON or Form Extractor
// =============================================================================

/// Extractor accepting either a JSON or a form-encoded body.
///
/// `application/x-www-form-urlencoded` bodies are read as forms, everything
/// else as JSON. Malformed bodies are rejected with 400.
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form body: {}", e)))?;
            Ok(JsonOrForm(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;
            Ok(JsonOrForm(value))
        }
    }
}

fn is_form<B>(req: &Request<B>) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

// =============================================================================
// Tests
// =============================================================================

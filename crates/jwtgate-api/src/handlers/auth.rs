// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{response::IntoResponse, Extension, Json};
use jwtgate_core::{AuthError, AuthManager, TokenClaims, TokenPair};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{Claims, JsonOrForm, Manager};
use crate::middleware::IssuedToken;

// =============================================================================
// Token Response
// =============================================================================

/// Body returned by login and refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// New refresh token.
    pub refresh_token: String,
    /// Claims signed into the new access token.
    pub token_data: TokenClaims,
    /// New access token. Omitted in cookie mode, where it travels in the cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

fn token_response(manager: &AuthManager, pair: TokenPair) -> impl IntoResponse {
    let access_token = match manager.use_cookie() {
        Some(_) => None,
        None => Some(pair.access_token.clone()),
    };

    (
        Extension(IssuedToken(pair.access_token)),
        Json(TokenResponse {
            refresh_token: pair.refresh_token,
            token_data: pair.claims,
            access_token,
        }),
    )
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
///
/// The subject is the first non-empty of `username`, `login` and `email`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: Option<String>,
    /// Alternative subject field.
    pub login: Option<String>,
    /// Alternative subject field.
    pub email: Option<String>,
    /// Password.
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the subject the client identified itself with.
    pub fn subject(&self) -> Option<&str> {
        [&self.username, &self.login, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }

    /// Returns the password, if not empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|s| !s.is_empty())
    }
}

/// POST {prefix}/login
///
/// Checks the credential and issues a token pair.
pub async fn login(
    Manager(manager): Manager,
    JsonOrForm(request): JsonOrForm<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(subject), Some(password)) = (request.subject(), request.password()) else {
        return Err(AuthError::MissingCredentials.into());
    };

    if !manager.check_credential(subject, password).await {
        tracing::info!(subject = %subject, "Login refused");
        return Err(AuthError::BadCredentials.into());
    }

    let pair = manager.create_tokens(subject).await?;

    tracing::info!(subject = %subject, "User logged in");

    Ok(token_response(&manager, pair))
}

// =============================================================================
// Refresh
// =============================================================================

/// Refresh request body.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from the previous issuance.
    pub refresh_token: Option<String>,
}

/// POST {prefix}/refresh
///
/// Exchanges a live refresh token for a new pair.
pub async fn refresh(
    Manager(manager): Manager,
    JsonOrForm(request): JsonOrForm<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let refresh_token = request
        .refresh_token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingRefreshToken)?;

    let pair = manager.refresh_tokens(&refresh_token).await?;

    tracing::debug!(subject = %pair.claims.subject, "Token pair refreshed");

    Ok(token_response(&manager, pair))
}

// =============================================================================
// Logoff
// =============================================================================

/// GET {prefix}/logoff
///
/// Ends the session of the authenticated subject.
pub async fn logoff(
    Manager(manager): Manager,
    Claims(claims): Claims,
) -> ApiResult<impl IntoResponse> {
    if manager.reset_refresh_token(&claims.subject).await? {
        tracing::info!(subject = %claims.subject, "User logged off");
    } else {
        tracing::warn!(subject = %claims.subject, "Logoff without a live session");
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// Current User
// =============================================================================

/// GET {prefix}/me
///
/// Returns the verified claims.
pub async fn me(Claims(claims): Claims) -> Json<TokenClaims> {
    Json(claims)
}

// =============================================================================
// Tests
// =============================================================================

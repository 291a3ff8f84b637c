// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token pair lifecycle: issue, rotate, revoke.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::Algorithm;
use rand::RngCore;
use serde::Serialize;

use crate::claims::{TokenClaims, UserData};
use crate::codec::TokenCodec;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::store::SessionStore;

/// Number of random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

// =============================================================================
// AuthProvider
// =============================================================================

/// Caller-supplied credential checking and user data construction.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Checks a subject/secret pair. Must not touch session state.
    async fn check_credential(&self, subject: &str, secret: &str) -> bool;

    /// Builds the user data embedded into the subject's tokens.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidSubject`] if the subject is disabled or unknown.
    async fn create_user_data(&self, subject: &str) -> AuthResult<UserData>;
}

// =============================================================================
// TokenPair
// =============================================================================

/// Result of a token issuance.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Claims signed into the access token.
    pub claims: TokenClaims,
    /// Refresh token bound to the subject's session.
    pub refresh_token: String,
}

// =============================================================================
// AuthManager
// =============================================================================

/// Composes the token codec, a provider, and a session store into the token
/// pair lifecycle.
///
/// Holds no mutable state of its own; share it behind an `Arc`.
pub struct AuthManager {
    config: AuthConfig,
    codec: TokenCodec,
    provider: Arc<dyn AuthProvider>,
    store: Arc<dyn SessionStore>,
}

impl AuthManager {
    /// Creates a new manager.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the configuration is invalid.
    pub fn new(
        config: AuthConfig,
        provider: Arc<dyn AuthProvider>,
        store: Arc<dyn SessionStore>,
    ) -> AuthResult<Self> {
        let codec = TokenCodec::new(&config)?;

        Ok(Self {
            config,
            codec,
            provider,
            store,
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Returns the signing secret.
    pub fn secret(&self) -> &str {
        &self.config.secret
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    /// Returns the access token lifetime.
    pub fn access_token_ttl(&self) -> Duration {
        self.config.access_token_ttl
    }

    /// Returns the cookie name carrying the access token, if cookies are used.
    pub fn use_cookie(&self) -> Option<&str> {
        self.config.use_cookie.as_deref()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    // =========================================================================
    // Provider delegation
    // =========================================================================

    /// Checks a subject/secret pair.
    pub async fn check_credential(&self, subject: &str, secret: &str) -> bool {
        self.provider.check_credential(subject, secret).await
    }

    /// Builds user data for a subject.
    pub async fn create_user_data(&self, subject: &str) -> AuthResult<UserData> {
        self.provider.create_user_data(subject).await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Issues a new token pair for `subject` and starts (or replaces) its session.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidSubject`] if the provider rejects the subject or
    ///   builds no user data
    /// - [`AuthError::SessionNotSaved`] / [`AuthError::Store`] if the refresh
    ///   token could not be persisted; no pair is returned in that case
    pub async fn create_tokens(&self, subject: &str) -> AuthResult<TokenPair> {
        let user_data = self.create_user_data(subject).await?;
        if user_data.is_null() {
            return Err(AuthError::invalid_subject("cannot create token data"));
        }

        let claims = self.codec.claims_for(subject, user_data);
        self.create_tokens_for(claims).await
    }

    /// Issues a token pair for caller-built claims.
    ///
    /// A pre-populated expiry is kept as is.
    pub async fn create_tokens_for(&self, claims: TokenClaims) -> AuthResult<TokenPair> {
        let access_token = self.codec.encode(&claims)?;
        let refresh_token = new_refresh_token();

        if !self
            .store
            .save_refresh_token(&claims.subject, &refresh_token)
            .await?
        {
            tracing::error!(subject = %claims.subject, "Session store refused refresh token");
            return Err(AuthError::SessionNotSaved);
        }

        tracing::debug!(subject = %claims.subject, exp = claims.exp, "Token pair issued");

        Ok(TokenPair {
            access_token,
            claims,
            refresh_token,
        })
    }

    /// Resolves a refresh token to its subject.
    pub async fn check_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<String>> {
        Ok(self.store.check_refresh_token(refresh_token).await?)
    }

    /// Rotates a session: exchanges a live refresh token for a new pair.
    ///
    /// The submitted refresh token stops resolving once the new one is saved.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidRefreshToken`] if the token has no live session.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let subject = self
            .check_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        tracing::debug!(subject = %subject, "Rotating token pair");
        self.create_tokens(&subject).await
    }

    /// Ends the session of `subject`.
    ///
    /// Returns `false` if the subject had no session.
    pub async fn reset_refresh_token(&self, subject: &str) -> AuthResult<bool> {
        Ok(self.store.reset_refresh_token(subject).await?)
    }

    /// Verifies an access token.
    pub fn decode_token(&self, token: &str, verify_expiry: bool) -> AuthResult<TokenClaims> {
        self.codec.decode(token, verify_expiry)
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("algorithm", &self.config.algorithm)
            .field("access_token_ttl", &self.config.access_token_ttl)
            .field("use_cookie", &self.config.use_cookie)
            .finish()
    }
}

/// Generates an unguessable refresh token.
pub fn new_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Tests
// =============================================================================

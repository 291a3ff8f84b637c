// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access token encoding and verification.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{TokenClaims, UserData};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

// =============================================================================
// TokenCodec
// =============================================================================

/// Signs claims into access tokens and verifies them back.
///
/// Cheap to clone; keys and validation rules are shared.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    access_token_ttl: Duration,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    lenient_validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a codec from the given configuration.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let validation = build_validation(config, true);
        let lenient_validation = build_validation(config, false);

        Ok(Self {
            algorithm: config.algorithm,
            access_token_ttl: config.access_token_ttl,
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            lenient_validation: Arc::new(lenient_validation),
        })
    }

    /// Builds claims for a subject expiring one access token lifetime from now.
    pub fn claims_for(&self, subject: impl Into<String>, user_data: UserData) -> TokenClaims {
        TokenClaims::new(subject, user_data, self.access_token_ttl)
    }

    /// Signs the claims into an access token.
    pub fn encode(&self, claims: &TokenClaims) -> AuthResult<String> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::encoding(e.to_string()))
    }

    /// Verifies an access token and returns its claims.
    ///
    /// The signature is always verified. The expiry is verified only when
    /// `verify_expiry` is `true`.
    pub fn decode(&self, token: &str, verify_expiry: bool) -> AuthResult<TokenClaims> {
        let validation = if verify_expiry {
            &self.validation
        } else {
            &self.lenient_validation
        };

        decode::<TokenClaims>(token, &self.decoding_key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::invalid_token("token has expired"),
                ErrorKind::InvalidSignature => AuthError::invalid_token("invalid token signature"),
                ErrorKind::InvalidToken => AuthError::invalid_token("invalid token format"),
                ErrorKind::InvalidAlgorithm => AuthError::invalid_token("unexpected token algorithm"),
                ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::invalid_token(format!("missing claim '{}'", claim))
                }
                _ => AuthError::invalid_token(format!("token validation failed: {}", e)),
            })
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the access token lifetime.
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .finish()
    }
}

fn build_validation(config: &AuthConfig, verify_expiry: bool) -> Validation {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_exp = verify_expiry;
    validation.validate_aud = false;
    validation.leeway = config.leeway.as_secs();
    validation.set_required_spec_claims(&["exp"]);
    validation
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for jwtgate.
//!
//! # Error Hierarchy
//!
//! ```text
//! AuthError (root)
//! ├── credential errors   - BadCredentials, MissingCredentials, InvalidSubject
//! ├── token errors        - InvalidToken, InvalidRefreshToken, MissingRefreshToken
//! ├── authorization       - InsufficientRights
//! └── internal failures   - Encoding, SessionNotSaved, Store, Extraction, Rule, Config
//! ```
//!
//! Internal failures carry their cause for logging only. The HTTP layer never
//! sends their message to the client.
//!
//! # Examples
//!
//! ```
//! use jwtgate_core::error::AuthError;
//!
//! let error = AuthError::invalid_token("signature mismatch");
//! assert!(error.is_client_error());
//! assert_eq!(error.status_code(), 401);
//! ```

use thiserror::Error;

/// Result type alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for session store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed error returned by pluggable collaborators (token getters, rules).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// AuthError
// =============================================================================

/// Errors produced by the token lifecycle engine and the request gate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The subject/secret pair was rejected by the credential check.
    #[error("Username or password is not correct")]
    BadCredentials,

    /// The request did not carry a subject or a secret.
    #[error("Absent user credential")]
    MissingCredentials,

    /// The request did not carry a refresh token.
    #[error("Absent refresh token")]
    MissingRefreshToken,

    /// The subject is disabled or unknown; issuance was aborted.
    #[error("Invalid subject: {message}")]
    InvalidSubject {
        /// Reason reported by the provider.
        message: String,
    },

    /// The access token failed signature, structure, or expiry checks.
    #[error("Invalid or outdated access token: {reason}")]
    InvalidToken {
        /// Verification failure detail.
        reason: String,
    },

    /// The refresh token does not resolve to a live session.
    #[error("Bad refresh token")]
    InvalidRefreshToken,

    /// No valid claims were presented on a route that requires them.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// An authorization rule returned `false`.
    #[error("Insufficient access rights")]
    InsufficientRights,

    /// Claims could not be serialized or signed.
    #[error("Cannot encode token: {message}")]
    Encoding {
        /// Encoder error detail.
        message: String,
    },

    /// The session store reported that the refresh token was not persisted.
    #[error("Cannot save refresh token")]
    SessionNotSaved,

    /// The session store failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// The token getter failed.
    #[error("Cannot extract access token: {source}")]
    Extraction {
        /// Underlying getter error.
        #[source]
        source: BoxError,
    },

    /// An authorization rule failed to execute.
    #[error("Cannot execute authorization rule: {source}")]
    Rule {
        /// Underlying rule error.
        #[source]
        source: BoxError,
    },

    /// Invalid configuration.
    #[error("Invalid configuration for '{field}': {message}")]
    Config {
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },
}

impl AuthError {
    /// Creates an invalid subject error.
    pub fn invalid_subject(message: impl Into<String>) -> Self {
        Self::InvalidSubject {
            message: message.into(),
        }
    }

    /// Creates an invalid token error.
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Wraps a token getter failure.
    pub fn extraction(source: impl Into<BoxError>) -> Self {
        Self::Extraction {
            source: source.into(),
        }
    }

    /// Wraps an authorization rule failure.
    pub fn rule(source: impl Into<BoxError>) -> Self {
        Self::Rule {
            source: source.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingCredentials | AuthError::MissingRefreshToken => 400,
            AuthError::InvalidSubject { .. }
            | AuthError::InvalidToken { .. }
            | AuthError::InvalidRefreshToken
            | AuthError::AuthenticationRequired => 401,
            AuthError::InsufficientRights => 403,
            AuthError::BadCredentials => 404,
            AuthError::Encoding { .. }
            | AuthError::SessionNotSaved
            | AuthError::Store(_)
            | AuthError::Extraction { .. }
            | AuthError::Rule { .. }
            | AuthError::Config { .. } => 500,
        }
    }

    /// Returns `true` if the error is caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Returns the error kind as a string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::BadCredentials => "bad_credentials",
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::MissingRefreshToken => "missing_refresh_token",
            AuthError::InvalidSubject { .. } => "invalid_subject",
            AuthError::InvalidToken { .. } => "invalid_token",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::InsufficientRights => "insufficient_rights",
            AuthError::Encoding { .. } => "encoding",
            AuthError::SessionNotSaved => "session_not_saved",
            AuthError::Store(_) => "store",
            AuthError::Extraction { .. } => "extraction",
            AuthError::Rule { .. } => "rule",
            AuthError::Config { .. } => "config",
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Session store failures.
///
/// "No such session" is not an error; stores report it through `Ok(false)`
/// or `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Session backend unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The backend failed while executing an operation.
    #[error("Session backend failure: {message}")]
    Backend {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

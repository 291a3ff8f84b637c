// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # jwtgate-core
//!
//! Token lifecycle engine for jwtgate.
//!
//! This crate owns everything that does not depend on HTTP:
//!
//! - **Config**: `AuthConfig` with secret, algorithm, lifetimes and cookie name
//! - **Claims**: the `TokenClaims` payload signed into every access token
//! - **Codec**: signing and verification of access tokens
//! - **Store**: the `SessionStore` contract and an in-process implementation
//! - **Manager**: `AuthManager`, which issues, rotates and revokes token pairs
//! - **Error**: unified error hierarchy
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jwtgate_core::{AuthConfig, AuthManager, MemorySessionStore};
//!
//! let config = AuthConfig::new("a-secret-that-is-long-enough-for-hmac");
//! let manager = AuthManager::new(config, Arc::new(MyProvider), Arc::new(MemorySessionStore::new()))?;
//!
//! let pair = manager.create_tokens("a@b.com").await?;
//! let rotated = manager.refresh_tokens(&pair.refresh_token).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod store;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use claims::{TokenClaims, UserData};
pub use codec::TokenCodec;
pub use config::{AuthConfig, ACCESS_TOKEN_TTL, DEFAULT_ALGORITHM};
pub use error::{AuthError, AuthResult, BoxError, StoreError, StoreResult};
pub use manager::{new_refresh_token, AuthManager, AuthProvider, TokenPair, REFRESH_TOKEN_BYTES};
pub use store::{MemorySessionStore, SessionStore};

pub use jsonwebtoken::Algorithm;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

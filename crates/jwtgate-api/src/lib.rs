// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # jwtgate-api
//!
//! HTTP request gate for jwtgate.
//!
//! Every route is registered with a [`RoutePolicy`] through [`AuthRouter`]
//! and wrapped in its own gate, which extracts the access token (cookie or
//! [`TokenGetter`]), verifies it, runs the route's [`AuthorizationRule`]s and
//! keeps the access token cookie in sync. The crate also ships the login,
//! refresh, logoff and me handlers and an [`AuthServer`] with tracing,
//! timeout and CORS layers.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod getter;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod rules;
pub mod server;

pub use config::{CorsConfig, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorDetails, ErrorResponseBody};
pub use extractors::{Claims, JsonOrForm, Manager, MaybeClaims};
pub use getter::{
    bearer_token, getter_fn, BearerTokenGetter, FnTokenGetter, HeaderTokenGetter,
    QueryTokenGetter, TokenGetter,
};
pub use handlers::{LoginRequest, RefreshRequest, TokenResponse};
pub use middleware::{AuthLayer, AuthMiddleware, GateState, IssuedToken};
pub use routes::{AuthRouter, RoutePolicy, DEFAULT_AUTH_PREFIX};
pub use rules::{claims_of, rule_fn, AuthorizationRule, FnRule, RequireSubject, RequireUserData};
pub use server::AuthServer;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

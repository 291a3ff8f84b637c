// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request gate middleware.
//!
//! For every request the gate extracts a candidate access token, verifies it
//! against the route's [`RoutePolicy`], runs the route's authorization rules
//! and either rejects the request or dispatches it. On the way out it keeps
//! the access token cookie in sync when cookie mode is on.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use http::request::Parts;
use jwtgate_core::{AuthError, AuthManager, AuthResult};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::getter::{BearerTokenGetter, TokenGetter};
use crate::routes::RoutePolicy;

// =============================================================================
// GateState
// =============================================================================

/// Progress of a request through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No token was found on the request.
    NoToken,
    /// A token was found but not yet verified.
    TokenPresent,
    /// The token verified; claims are attached.
    Verified,
    /// The token failed verification.
    InvalidToken,
    /// The request was refused.
    Rejected,
    /// The request was handed to the route handler.
    Dispatched,
}

impl GateState {
    /// Returns the state name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::NoToken => "no_token",
            GateState::TokenPresent => "token_present",
            GateState::Verified => "verified",
            GateState::InvalidToken => "invalid_token",
            GateState::Rejected => "rejected",
            GateState::Dispatched => "dispatched",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// IssuedToken
// =============================================================================

/// Response extension carrying an access token issued by a handler.
///
/// In cookie mode the gate moves it into the access token cookie.
#[derive(Debug, Clone)]
pub struct IssuedToken(pub String);

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that gates a single route.
#[derive(Clone)]
pub struct AuthLayer {
    manager: Arc<AuthManager>,
    token_getter: Arc<dyn TokenGetter>,
    policy: Arc<RoutePolicy>,
}

impl AuthLayer {
    /// Creates a gate for a route with the given policy.
    ///
    /// Tokens are read from the bearer header unless another getter is set.
    pub fn new(manager: Arc<AuthManager>, policy: RoutePolicy) -> Self {
        Self {
            manager,
            token_getter: Arc::new(BearerTokenGetter),
            policy: Arc::new(policy),
        }
    }

    /// Sets the token getter.
    pub fn with_token_getter(mut self, token_getter: Arc<dyn TokenGetter>) -> Self {
        self.token_getter = token_getter;
        self
    }

    /// Returns the route policy.
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            manager: self.manager.clone(),
            token_getter: self.token_getter.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl fmt::Debug for AuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthLayer")
            .field("policy", &self.policy)
            .finish()
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware produced by [`AuthLayer`].
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    manager: Arc<AuthManager>,
    token_getter: Arc<dyn TokenGetter>,
    policy: Arc<RoutePolicy>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let manager = self.manager.clone();
        let token_getter = self.token_getter.clone();
        let policy = self.policy.clone();
        let mut inner = self.inner.clone();

        let span = tracing::debug_span!(
            "gate",
            request_id = %Uuid::now_v7(),
            method = %req.method(),
            path = %req.uri().path(),
        );

        Box::pin(
            async move {
                let (mut parts, body) = req.into_parts();
                parts.extensions.insert(manager.clone());

                let presented =
                    match admit(&manager, token_getter.as_ref(), &policy, &mut parts).await {
                        Ok(presented) => presented,
                        Err(error) => {
                            tracing::debug!(
                                state = %GateState::Rejected,
                                reason = error.kind(),
                                "Request rejected"
                            );
                            return Ok(ApiError::from(error).into_response());
                        }
                    };

                tracing::trace!(state = %GateState::Dispatched, "Dispatching request");
                let mut response = inner.call(Request::from_parts(parts, body)).await?;

                if let Some(cookie_name) = manager.use_cookie() {
                    sync_cookie(&mut response, cookie_name, &policy, presented);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

impl<S> fmt::Debug for AuthMiddleware<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthMiddleware")
            .field("policy", &self.policy)
            .finish()
    }
}

// =============================================================================
// Gate procedure
// =============================================================================

/// Runs extraction, verification and authorization.
///
/// Returns the presented token if it verified, so the response phase can
/// re-set the cookie.
async fn admit(
    manager: &AuthManager,
    token_getter: &dyn TokenGetter,
    policy: &RoutePolicy,
    parts: &mut Parts,
) -> AuthResult<Option<String>> {
    let token = extract_token(manager, token_getter, parts).await?;

    let mut state = if token.is_some() {
        GateState::TokenPresent
    } else {
        GateState::NoToken
    };

    let mut verified = None;
    if let Some(token) = token {
        match manager.decode_token(&token, !policy.exempt_from_expiry_check) {
            Ok(claims) => {
                tracing::debug!(subject = %claims.subject, "Access token verified");
                parts.extensions.insert(claims);
                state = GateState::Verified;
                verified = Some(token);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Access token rejected");
                state = GateState::InvalidToken;
            }
        }
    }

    tracing::trace!(state = %state, "Token checked");

    let Some(rules) = &policy.rules else {
        return Ok(verified);
    };

    match state {
        GateState::Verified => {}
        GateState::InvalidToken => {
            return Err(AuthError::invalid_token("presented token failed verification"))
        }
        _ => return Err(AuthError::AuthenticationRequired),
    }

    let parts: &Parts = parts;
    for rule in rules {
        match rule.check(parts).await {
            Ok(true) => {}
            Ok(false) => return Err(AuthError::InsufficientRights),
            Err(e) => return Err(AuthError::rule(e)),
        }
    }

    Ok(verified)
}

/// Reads the cookie (cookie mode) and falls back to the token getter.
async fn extract_token(
    manager: &AuthManager,
    token_getter: &dyn TokenGetter,
    parts: &Parts,
) -> AuthResult<Option<String>> {
    if let Some(cookie_name) = manager.use_cookie() {
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(cookie_name) {
            if !cookie.value().is_empty() {
                return Ok(Some(cookie.value().to_string()));
            }
        }
    }

    token_getter
        .get_token(parts)
        .await
        .map_err(AuthError::extraction)
}

// =============================================================================
// Cookie propagation
// =============================================================================

fn sync_cookie(
    response: &mut Response,
    cookie_name: &str,
    policy: &RoutePolicy,
    presented: Option<String>,
) {
    let issued = response.extensions_mut().remove::<IssuedToken>();

    let cookie = if policy.ends_session {
        Some(removal_cookie(cookie_name))
    } else {
        issued
            .map(|IssuedToken(token)| token)
            .or(presented)
            .map(|token| session_cookie(cookie_name, token))
    };

    let Some(cookie) = cookie else {
        return;
    };

    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => {
            tracing::error!(error = %e, cookie = cookie_name, "Cannot encode access token cookie");
        }
    }
}

/// Builds the HTTP-only cookie carrying an access token.
pub fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .http_only(true)
        .path("/")
        .build()
}

/// Builds a cookie that clears the access token cookie.
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route registration with per-route gate policies.

use std::fmt;
use std::sync::Arc;

use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use jwtgate_core::AuthManager;

use crate::getter::{BearerTokenGetter, TokenGetter};
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::rules::AuthorizationRule;

/// Default mount point of the built-in auth routes.
pub const DEFAULT_AUTH_PREFIX: &str = "/auth";

// =============================================================================
// RoutePolicy
// =============================================================================

/// Gate behaviour for one route, fixed at registration.
#[derive(Clone, Default)]
pub struct RoutePolicy {
    /// `None` means soft authentication: the request passes with or without
    /// valid claims. `Some` requires valid claims and every rule to pass.
    pub rules: Option<Vec<Arc<dyn AuthorizationRule>>>,
    /// Accept access tokens whose lifetime has elapsed.
    pub exempt_from_expiry_check: bool,
    /// Clear the access token cookie instead of re-setting it.
    pub ends_session: bool,
}

impl RoutePolicy {
    /// Soft authentication: claims are attached when valid, never required.
    pub fn soft() -> Self {
        Self::default()
    }

    /// Valid claims required, no further rules.
    pub fn authenticated() -> Self {
        Self {
            rules: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Valid claims required and every rule must pass.
    pub fn with_rules(rules: Vec<Arc<dyn AuthorizationRule>>) -> Self {
        Self {
            rules: Some(rules),
            ..Self::default()
        }
    }

    /// Appends a rule. Turns a soft policy into an authenticated one.
    pub fn rule(mut self, rule: impl AuthorizationRule + 'static) -> Self {
        self.rules.get_or_insert_with(Vec::new).push(Arc::new(rule));
        self
    }

    /// Accepts expired access tokens on this route.
    pub fn exempt_from_expiry_check(mut self) -> Self {
        self.exempt_from_expiry_check = true;
        self
    }

    /// Marks this route as ending the session.
    pub fn ends_session(mut self) -> Self {
        self.ends_session = true;
        self
    }

    /// Returns `true` if valid claims are required.
    pub fn requires_authentication(&self) -> bool {
        self.rules.is_some()
    }
}

impl fmt::Debug for RoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePolicy")
            .field("rules", &self.rules.as_ref().map(Vec::len))
            .field("exempt_from_expiry_check", &self.exempt_from_expiry_check)
            .field("ends_session", &self.ends_session)
            .finish()
    }
}

// =============================================================================
// AuthRouter
// =============================================================================

/// Router where every route is registered together with its [`RoutePolicy`].
///
/// Each route gets its own gate, so the policy is known before any request
/// arrives.
///
/// ```rust,ignore
/// let app: Router = AuthRouter::new(manager)
///     .with_auth_routes()
///     .route("/api/message", get(message), RoutePolicy::authenticated())
///     .route("/health", get(health), RoutePolicy::soft())
///     .into_router();
/// ```
pub struct AuthRouter<S = ()> {
    manager: Arc<AuthManager>,
    token_getter: Arc<dyn TokenGetter>,
    routes: Vec<(String, MethodRouter<S>, RoutePolicy)>,
}

impl<S> AuthRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty router.
    pub fn new(manager: Arc<AuthManager>) -> Self {
        Self {
            manager,
            token_getter: Arc::new(BearerTokenGetter),
            routes: Vec::new(),
        }
    }

    /// Sets the token getter used by every route of this router.
    pub fn with_token_getter(mut self, token_getter: impl TokenGetter + 'static) -> Self {
        self.token_getter = Arc::new(token_getter);
        self
    }

    /// Registers a route.
    pub fn route(mut self, path: &str, method_router: MethodRouter<S>, policy: RoutePolicy) -> Self {
        self.routes.push((path.to_string(), method_router, policy));
        self
    }

    /// Mounts login, refresh, logoff and me under [`DEFAULT_AUTH_PREFIX`].
    pub fn with_auth_routes(self) -> Self {
        self.with_prefix(DEFAULT_AUTH_PREFIX)
    }

    /// Mounts login, refresh, logoff and me under `prefix`.
    pub fn with_prefix(self, prefix: &str) -> Self {
        let prefix = normalize_prefix(prefix);

        self.route(
            &format!("{}/login", prefix),
            post(handlers::login),
            RoutePolicy::soft(),
        )
        .route(
            &format!("{}/refresh", prefix),
            post(handlers::refresh),
            RoutePolicy::soft().exempt_from_expiry_check(),
        )
        .route(
            &format!("{}/logoff", prefix),
            get(handlers::logoff),
            RoutePolicy::authenticated()
                .exempt_from_expiry_check()
                .ends_session(),
        )
        .route(
            &format!("{}/me", prefix),
            get(handlers::me),
            RoutePolicy::authenticated(),
        )
    }

    /// Returns the manager shared by every gate.
    pub fn manager(&self) -> &Arc<AuthManager> {
        &self.manager
    }

    /// Builds the axum router.
    pub fn into_router(self) -> Router<S> {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, (path, method_router, policy)| {
                tracing::debug!(path = %path, policy = ?policy, "Registering gated route");
                let gate = AuthLayer::new(self.manager.clone(), policy)
                    .with_token_getter(self.token_getter.clone());
                router.route(&path, method_router.layer(gate))
            })
    }
}

impl<S> fmt::Debug for AuthRouter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRouter")
            .field(
                "routes",
                &self.routes.iter().map(|(path, ..)| path.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Strips trailing slashes and ensures a leading one. The root prefix is empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application assembly: manager, auth routes and the demo API.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use jwtgate_api::{AuthRouter, Claims, MaybeClaims, RoutePolicy};
use jwtgate_core::{AuthManager, AuthResult, MemorySessionStore};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::directory::DirectoryProvider;

/// Builds the manager over the configured user directory and an in-memory
/// session store.
pub fn build_manager(config: &AppConfig) -> AuthResult<Arc<AuthManager>> {
    let provider = DirectoryProvider::new(config.users.iter().cloned());
    let manager = AuthManager::new(
        config.server.auth.clone(),
        Arc::new(provider),
        Arc::new(MemorySessionStore::new()),
    )?;
    Ok(Arc::new(manager))
}

/// Builds the full application router.
pub fn build_app(config: &AppConfig) -> AuthResult<Router> {
    let manager = build_manager(config)?;
    Ok(routes(manager, &config.server.auth_prefix))
}

/// Mounts the auth routes under `prefix` next to the demo routes.
///
/// | Route | Policy |
/// |-------|--------|
/// | `GET /api/message` | authenticated |
/// | `GET /health` | soft |
pub fn routes(manager: Arc<AuthManager>, prefix: &str) -> Router {
    AuthRouter::new(manager)
        .with_prefix(prefix)
        .route("/api/message", get(message), RoutePolicy::authenticated())
        .route("/health", get(health), RoutePolicy::soft())
        .into_router()
}

async fn message(Claims(claims): Claims) -> Json<Value> {
    Json(json!({
        "message": format!(
            "This is very, very protected data. Current time: {}",
            chrono::Utc::now().to_rfc3339()
        ),
        "username": claims.subject,
    }))
}

async fn health(MaybeClaims(claims): MaybeClaims) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "authenticated": claims.is_some(),
    }))
}

// =============================================================================
// Tests
// =============================================================================

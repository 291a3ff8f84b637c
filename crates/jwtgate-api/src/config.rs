// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use jwtgate_core::{AuthConfig, AuthError, AuthResult};
use serde::{Deserialize, Serialize};

use crate::routes::DEFAULT_AUTH_PREFIX;

// =============================================================================
// ServerConfig
// =============================================================================

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Mount point of the login, refresh, logoff and me routes.
    pub auth_prefix: String,
    /// Token lifecycle configuration.
    pub auth: AuthConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token lifecycle configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the auth route prefix.
    pub fn with_auth_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_prefix = prefix.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        self.auth.validate()?;

        if self.request_timeout.is_zero() {
            return Err(AuthError::config("request_timeout", "must be greater than zero"));
        }
        if !self.auth_prefix.is_empty() && !self.auth_prefix.starts_with('/') {
            return Err(AuthError::config("auth_prefix", "must start with '/'"));
        }
        self.cors.validate()
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed headers. `"*"` allows any header.
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials (cookies).
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a configuration for browser clients on known origins using the
    /// access token cookie.
    pub fn with_credentials(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            allow_credentials: true,
            ..Self::default()
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.allow_credentials
            && (self.allows_any_origin() || self.allowed_headers.iter().any(|h| h == "*"))
        {
            return Err(AuthError::config(
                "cors",
                "credentials cannot be combined with wildcard origins or headers",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Auth manager configuration.

use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Default access token lifetime.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Default signing algorithm.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// AuthConfig
// =============================================================================

/// Configuration for an [`AuthManager`](crate::AuthManager).
///
/// Immutable once handed to the manager. `Debug` output never contains the
/// secret.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Signing algorithm (HMAC family only).
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,
    /// Cookie name used to carry the access token. `None` disables cookies.
    pub use_cookie: Option<String>,
    /// Clock skew tolerance applied to expiry checks.
    #[serde(with = "humantime_serde")]
    pub leeway: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            algorithm: DEFAULT_ALGORITHM,
            access_token_ttl: ACCESS_TOKEN_TTL,
            use_cookie: None,
            leeway: Duration::ZERO,
        }
    }
}

impl AuthConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Enables cookie transport under the given cookie name.
    pub fn with_cookie(mut self, name: impl Into<String>) -> Self {
        self.use_cookie = Some(name.into());
        self
    }

    /// Disables cookie transport.
    pub fn without_cookie(mut self) -> Self {
        self.use_cookie = None;
        self
    }

    /// Sets the expiry leeway.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::config("secret", "signing secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("Signing secret is shorter than recommended (32 bytes)");
        }
        if !is_hmac(self.algorithm) {
            return Err(AuthError::config(
                "algorithm",
                format!("{:?} is not an HMAC algorithm", self.algorithm),
            ));
        }
        if self.access_token_ttl.is_zero() {
            return Err(AuthError::config("access_token_ttl", "must be greater than zero"));
        }
        if let Some(name) = &self.use_cookie {
            if name.is_empty() || !name.chars().all(is_cookie_name_char) {
                return Err(AuthError::config(
                    "use_cookie",
                    format!("'{}' is not a valid cookie name", name),
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = if self.secret.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("AuthConfig")
            .field("secret", &secret)
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("use_cookie", &self.use_cookie)
            .field("leeway", &self.leeway)
            .finish()
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn is_cookie_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            other => return Err(serde::ser::Error::custom(format!(
                "Unsupported algorithm: {:?}",
                other
            ))),
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unknown algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new("super-secret-signing-key").with_cookie("jwtgate");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("super-secret-signing-key"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("HS256"));
        assert!(debug.contains("jwtgate"));

        assert!(!format!("{:?}", AuthConfig::default()).contains("[REDACTED]"));
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();

        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.access_token_ttl, Duration::from_secs(300));
        assert!(config.use_cookie.is_none());
        assert_eq!(config.leeway, Duration::ZERO);
    }

    #[test]
    fn test_validate_requires_secret() {
        assert!(AuthConfig::default().validate().is_err());
        assert!(AuthConfig::new("a-secret-that-is-long-enough-for-hmac").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_asymmetric_algorithm() {
        let config = AuthConfig::new("a-secret-that-is-long-enough-for-hmac")
            .with_algorithm(Algorithm::RS256);

        assert!(matches!(
            config.validate(),
            Err(AuthError::Config { ref field, .. }) if field == "algorithm"
        ));
    }

    #[test]
    fn test_validate_cookie_name() {
        let base = AuthConfig::new("a-secret-that-is-long-enough-for-hmac");

        assert!(base.clone().with_cookie("jwtgate").validate().is_ok());
        assert!(base.clone().with_cookie("bad name").validate().is_err());
        assert!(base.with_cookie("").validate().is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: AuthConfig = serde_json::from_value(serde_json::json!({
            "secret": "from-json",
            "algorithm": "hs512",
            "access_token_ttl": "10m",
            "use_cookie": "session",
        }))
        .unwrap();

        assert_eq!(config.secret, "from-json");
        assert_eq!(config.algorithm, Algorithm::HS512);
        assert_eq!(config.access_token_ttl, Duration::from_secs(600));
        assert_eq!(config.use_cookie.as_deref(), Some("session"));
    }
}

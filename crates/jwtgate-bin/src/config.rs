// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration file loading.
//!
//! The file format is picked by extension (YAML, TOML or JSON). Before
//! parsing, `${VAR}` and `${VAR:default}` placeholders are replaced from the
//! environment. After parsing, a few `JWTGATE_*` variables override the
//! loaded values:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `JWTGATE_SECRET` | `server.auth.secret` |
//! | `JWTGATE_PORT` | `server.port` |
//! | `JWTGATE_COOKIE` | `server.auth.use_cookie` (empty disables) |
//! | `JWTGATE_ACCESS_TOKEN_TTL` | `server.auth.access_token_ttl` |

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use jwtgate_api::ServerConfig;
use jwtgate_core::AuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::directory::UserEntry;

/// Default prefix of override variables.
pub const DEFAULT_ENV_PREFIX: &str = "JWTGATE";

// =============================================================================
// ConfigError
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Requested path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The extension maps to no known format.
    #[error("Unsupported configuration format: '{extension}'")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// The content could not be parsed.
    #[error("Cannot parse configuration: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// An override variable holds an unusable value.
    #[error("Invalid environment variable {name}: {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The parsed configuration is inconsistent.
    #[error("Invalid configuration for '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<AuthError> for ConfigError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Config { field, message } => Self::Validation { field, message },
            other => Self::validation("server", other.to_string()),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::parse(err.to_string())
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server and token lifecycle settings.
    pub server: ServerConfig,
    /// User directory.
    pub users: Vec<UserEntry>,
}

impl AppConfig {
    /// Validates the server settings and the user directory.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;

        let mut seen = HashSet::new();
        for (index, user) in self.users.iter().enumerate() {
            let field = format!("users[{}]", index);
            if user.username.is_empty() {
                return Err(ConfigError::validation(field, "username is empty"));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::validation(
                    field,
                    format!("duplicate username '{}'", user.username),
                ));
            }
            if argon2::password_hash::PasswordHash::new(&user.password_hash).is_err() {
                return Err(ConfigError::validation(
                    field,
                    "password_hash is not a PHC string (see `jwtgate hash-password`)",
                ));
            }
        }

        Ok(())
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// TOML (`.toml`)
    Toml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }

    fn file_format(self) -> config::FileFormat {
        match self {
            Self::Yaml => config::FileFormat::Yaml,
            Self::Toml => config::FileFormat::Toml,
            Self::Json => config::FileFormat::Json,
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads and validates [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
        }
    }
}

impl ConfigLoader {
    /// Creates a loader with the `JWTGATE` prefix and placeholders enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix of override variables.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads, overrides and validates a configuration file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?format, "Loading configuration");

        self.load_from_str(&content, format)
    }

    /// Loads, overrides and validates configuration content.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<AppConfig> {
        let mut config: AppConfig = if self.resolve_env_vars {
            parse_str(&resolve_env_placeholders(content), format)?
        } else {
            parse_str(content, format)?
        };

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    fn apply_env_overrides(&self, config: &mut AppConfig) -> ConfigResult<()> {
        if let (_, Some(secret)) = self.var("SECRET") {
            config.server.auth.secret = secret;
        }

        if let (name, Some(value)) = self.var("PORT") {
            config.server.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected a port number"))?;
        }

        if let (_, Some(value)) = self.var("COOKIE") {
            config.server.auth.use_cookie = Some(value).filter(|name| !name.is_empty());
        }

        if let (name, Some(value)) = self.var("ACCESS_TOKEN_TTL") {
            config.server.auth.access_token_ttl =
                humantime_serde::re::humantime::parse_duration(&value)
                    .map_err(|e| ConfigError::invalid_env_var(name, e.to_string()))?;
        }

        Ok(())
    }
}

/// Loads a configuration file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<AppConfig> {
    let source = config::Config::builder()
        .add_source(config::File::from_str(content, format.file_format()))
        .build()?;

    Ok(source.try_deserialize()?)
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
///
/// Unknown variables without a default and unterminated placeholders are
/// left untouched.
fn resolve_env_placeholders(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let placeholder = &after[..end];
        let (name, default) = match placeholder.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (placeholder, None),
        };

        match (env::var(name), default) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => {
                warn!("Environment variable '{}' not found", name);
                result.push_str(&rest[start..start + 2 + end + 1]);
            }
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

// =============================================================================
// Tests
// =============================================================================

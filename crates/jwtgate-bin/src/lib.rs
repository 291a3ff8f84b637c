// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # jwtgate-bin
//!
//! The `jwtgate` server binary.
//!
//! - CLI argument parsing with clap
//! - Configuration file loading with environment placeholders and overrides
//! - A configuration-backed user directory with argon2 password hashes
//! - Logging initialization and graceful shutdown
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! jwtgate
//!
//! # Start with a custom config
//! jwtgate -c /etc/jwtgate/config.yaml
//!
//! # Validate configuration
//! jwtgate validate
//!
//! # Hash a password for the users section
//! jwtgate hash-password "123456"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use app::{build_app, build_manager, routes};
pub use cli::{Cli, Commands};
pub use config::{load_config, AppConfig, ConfigError, ConfigFormat, ConfigLoader};
pub use directory::{hash_password, verify_password, DirectoryProvider, UserEntry};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

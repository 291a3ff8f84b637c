// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # jwtgate Integration Tests
//!
//! Shared fixtures, mocks and a spawned-server harness for the suites in
//! `tests/`.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p jwtgate-tests
//!
//! cargo test -p jwtgate-tests --test integration_core
//! cargo test -p jwtgate-tests --test integration_gate
//! cargo test -p jwtgate-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Core Tests (`integration_core.rs`)
//! - Token encode/decode and expiry handling
//! - Issuance, rotation and session uniqueness
//! - Session store failures
//!
//! ### Gate Tests (`integration_gate.rs`)
//! - Login, refresh, logoff and me over real HTTP
//! - Soft and required authentication, authorization rules
//! - Cookie transport
//!
//! ### Config Tests (`integration_config.rs`)
//! - Configuration files on disk
//! - The assembled sample application
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use jwtgate_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let server = TestServer::start(gated_app(AuthFixtures::manager())).await;
//!     let response = server.login(TEST_USER, TEST_PASSWORD).await;
//!     assert_eq!(response.status(), 200);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;
}

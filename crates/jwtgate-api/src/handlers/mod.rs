// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Built-in auth route handlers.
//!
//! - [`login`]: exchanges credentials for a token pair
//! - [`refresh`]: rotates a token pair
//! - [`logoff`]: ends the session
//! - [`me`]: returns the verified claims

mod auth;

pub use auth::*;

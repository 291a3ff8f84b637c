// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthMiddleware`]: per-route request gate

mod gate;

pub use gate::{removal_cookie, session_cookie, AuthLayer, AuthMiddleware, GateState, IssuedToken};

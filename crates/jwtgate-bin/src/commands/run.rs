// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use jwtgate_api::AuthServer;
use tracing::{info, warn};

use crate::app::build_app;
use crate::cli::{Cli, RunArgs};
use crate::config::ConfigLoader;
use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

/// Loads the configuration and serves until a shutdown signal.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!("Starting jwtgate...");

    let mut config = ConfigLoader::new()
        .load(&cli.config)
        .map_err(|e| BinError::from(e).with_context("Failed to load configuration"))?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.users.is_empty() {
        warn!("No users configured, every login will be refused");
    }

    let app = build_app(&config)
        .map_err(|e| BinError::from(e).with_context("Failed to build application"))?;

    info!(
        users = config.users.len(),
        auth_prefix = %config.server.auth_prefix,
        cookie = config.server.auth.use_cookie.as_deref().unwrap_or("disabled"),
        access_token_ttl = ?config.server.auth.access_token_ttl,
        "Auth manager ready"
    );

    let shutdown_timeout = config.server.shutdown_timeout;
    let server = AuthServer::new(config.server, app);
    let coordinator = ShutdownCoordinator::new();
    let mut server_task = tokio::spawn(server.run_with_shutdown(coordinator.shutdown_signal()));

    tokio::select! {
        result = &mut server_task => return server_result(result),
        _ = coordinator.wait_for_shutdown() => {}
    }

    match tokio::time::timeout(shutdown_timeout, server_task).await {
        Ok(result) => server_result(result),
        Err(_) => {
            warn!(timeout = ?shutdown_timeout, "Graceful shutdown timed out");
            Ok(())
        }
    }
}

fn server_result(
    result: Result<jwtgate_api::ApiResult<()>, tokio::task::JoinError>,
) -> BinResult<()> {
    match result {
        Ok(result) => Ok(result?),
        Err(e) => Err(BinError::runtime(format!("Server task failed: {}", e))),
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::config::{AppConfig, ConfigLoader};
use crate::error::{BinError, BinResult};

/// Recommended minimum HMAC secret length in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Validates the configuration file and prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ConfigLoader::new().load(config_path).map_err(|e| {
        BinError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    let warnings = collect_warnings(&config);
    let auth = &config.server.auth;

    match args.format {
        OutputFormat::Text => {
            println!("Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:           {}", config.server.socket_addr());
            println!("  Auth prefix:      {}", config.server.auth_prefix);
            println!("  Algorithm:        {:?}", auth.algorithm);
            println!(
                "  Access token TTL: {}",
                humantime_serde::re::humantime::format_duration(auth.access_token_ttl)
            );
            println!("  Cookie:           {}", auth.use_cookie.as_deref().unwrap_or("disabled"));
            println!("  Users:            {}", config.users.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "auth_prefix": config.server.auth_prefix,
                    "algorithm": format!("{:?}", auth.algorithm),
                    "access_token_ttl_secs": auth.access_token_ttl.as_secs(),
                    "cookie": auth.use_cookie,
                    "user_count": config.users.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| BinError::runtime(e.to_string()))?
            );
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns non-fatal findings about a valid configuration.
pub fn collect_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.users.is_empty() {
        warnings.push("No users configured".to_string());
    }
    if config.server.auth.secret.len() < MIN_SECRET_LEN {
        warnings.push(format!(
            "Signing secret is shorter than {} bytes",
            MIN_SECRET_LEN
        ));
    }
    if config.server.auth.use_cookie.is_some() && config.server.cors.allows_any_origin() {
        warnings.push(
            "Cookie mode with wildcard CORS origins: browsers will not send the cookie cross-origin"
                .to_string(),
        );
    }
    let disabled = config.users.iter().filter(|u| u.disabled).count();
    if disabled > 0 {
        warnings.push(format!("{} disabled user(s)", disabled));
    }

    warnings
}

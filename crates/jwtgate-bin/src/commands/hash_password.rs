// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use crate::cli::{Cli, HashPasswordArgs};
use crate::directory;
use crate::error::{BinError, BinResult};

/// Prints the argon2 hash of a password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = read_password(&args)?;
    if password.is_empty() {
        return Err(BinError::config("password is empty"));
    }

    let hash = directory::hash_password(&password)
        .map_err(|e| BinError::runtime(format!("Cannot hash password: {}", e)))?;

    println!("{}", hash);
    Ok(())
}

fn read_password(args: &HashPasswordArgs) -> BinResult<String> {
    if !args.stdin {
        return Ok(args.password.clone().unwrap_or_default());
    }

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! jwtgate binary entry point.

use clap::Parser;
use jwtgate_bin::{cli::Cli, commands, error::report_error_and_exit, logging::init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.effective_log_level(), cli.log_format);

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}

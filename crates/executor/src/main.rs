// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agor-executor binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use agor_executor::{run_feathers_mode, run_ipc_mode, ExecutorArgs, StartMode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = ExecutorArgs::parse();
    let outcome = match args.mode() {
        Ok(StartMode::Ipc { socket }) => run_ipc_mode(&socket).await,
        Ok(mode @ StartMode::Feathers { .. }) => run_feathers_mode(mode).await,
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        tracing::error!(error = %e, "executor failed");
        std::process::exit(1);
    }
}

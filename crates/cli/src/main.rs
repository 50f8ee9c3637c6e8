// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agor CLI entry point.

mod admin;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agor", about = "Agor multi-user agent control plane", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Privileged subcommands (invoked by the daemon via passwordless sudo)
    Admin(admin::AdminArgs),

    /// Run the orchestrator daemon in the foreground
    Daemon,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let outcome: anyhow::Result<()> = match cli.command {
        Command::Admin(args) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        if args.verbose { "info".into() } else { "warn".into() }
                    }),
                )
                .with_writer(std::io::stderr)
                .init();
            admin::run(args).await
        }
        Command::Daemon => agor_daemon::run_daemon().await.map_err(Into::into),
    };

    if let Err(e) = outcome {
        eprintln!("agor: {e:#}");
        std::process::exit(1);
    }
}

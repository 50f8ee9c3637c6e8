// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agord binary entry point.

#[tokio::main]
async fn main() {
    if let Err(e) = agor_daemon::run_daemon().await {
        eprintln!("agord: {e}");
        std::process::exit(1);
    }
}

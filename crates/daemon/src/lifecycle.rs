// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and shutdown.
//!
//! Startup order: state dir → exclusive lock file → logging → config →
//! snapshot → impersonation probe → RPC socket. Shutdown saves the
//! snapshot and releases everything in reverse.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use agor_auth::TokenSigner;
use agor_core::AgorConfig;
use agor_shell::DirectRunner;
use agor_storage::{load_snapshot, save_snapshot};
use agor_wire::bind_socket;
use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{error, info};

use crate::handlers::{DaemonCtx, DaemonRpcHandler};
use crate::pool::{locate_executor_binary, probe_impersonation, ExecutorPool};
use crate::{ChannelHub, SharedState};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no resolvable state directory (HOME unset)")]
    NoStateDir,

    #[error("another daemon holds the lock at {path}")]
    AlreadyRunning { path: PathBuf },

    #[error("I/O at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Config(#[from] agor_core::ConfigError),

    #[error(transparent)]
    Snapshot(#[from] agor_storage::SnapshotError),

    #[error(transparent)]
    Pool(#[from] crate::pool::PoolError),

    #[error(transparent)]
    Transport(#[from] agor_wire::ProtocolError),
}

fn io_err(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> LifecycleError + '_ {
    move |source| LifecycleError::Io { path: path.to_path_buf(), source }
}

/// Run the daemon until interrupted.
pub async fn run_daemon() -> Result<(), LifecycleError> {
    let state_dir = crate::env::state_dir().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(&state_dir).map_err(io_err(&state_dir))?;

    // One orchestrator per state dir
    let lock_path = state_dir.join("agord.lock");
    let lock_file = File::create(&lock_path).map_err(io_err(&lock_path))?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| LifecycleError::AlreadyRunning { path: lock_path.clone() })?;

    let file_appender = tracing_appender::rolling::daily(state_dir.join("logs"), "agord.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let config = match crate::env::config_path() {
        Some(path) if path.exists() => AgorConfig::load(&path)?,
        _ => AgorConfig::default(),
    };
    if let Some(dialect) = crate::env::db_dialect() {
        info!(dialect, "storage dialect requested (snapshot store ignores it)");
    }

    let db_path = crate::env::db_path().unwrap_or_else(|| state_dir.join("agor.json"));
    let state: SharedState = Arc::new(Mutex::new(load_snapshot(&db_path)?));

    let runner = DirectRunner;
    let probe = probe_impersonation(&config, &runner).await;
    info!(?probe, "impersonation probe");

    let pool = Arc::new(ExecutorPool::new(
        probe,
        locate_executor_binary()?,
        state_dir.join("sockets"),
        &config,
    ));
    let hub = Arc::new(ChannelHub::new());
    let signer = TokenSigner::new(config.auth.secret.as_bytes().to_vec());
    let ctx = DaemonCtx::new(Arc::clone(&state), Arc::clone(&hub), signer);

    let socket_path = state_dir.join("agord.sock");
    let listener = bind_socket(&socket_path)?;
    info!(socket = %socket_path.display(), port = ?crate::env::port(), "daemon listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let handler = DaemonRpcHandler::new(Arc::clone(&ctx));
                        let peer = agor_wire::RpcPeer::spawn(
                            stream,
                            Arc::clone(&handler),
                            config.limits.rpc_timeout(),
                        );
                        handler.set_peer(peer);
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    save_snapshot(&state.lock(), &db_path)?;
    let _ = std::fs::remove_file(&socket_path);
    let _ = fs2::FileExt::unlock(&lock_file);
    drop(pool);
    Ok(())
}

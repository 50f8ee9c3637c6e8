// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup modes.

use std::sync::Arc;
use std::time::Duration;

use agor_wire::{bind_socket, connect_socket, ExecutePromptParams, RpcPeer};
use tracing::{info, warn};

use crate::args::StartMode;
use crate::error::ExecutorError;
use crate::runtime::{ExecutorHandler, ExecutorState};

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PERMISSION_TIMEOUT: Duration = Duration::from_secs(60);

/// IPC mode: own the socket, accept exactly one connection from the
/// daemon, serve until shutdown.
pub async fn run_ipc_mode(socket: &std::path::Path) -> Result<(), ExecutorError> {
    let listener = bind_socket(socket)?;
    info!(socket = %socket.display(), "executor listening");

    // Session token arrives with each request in IPC mode; the state
    // starts without one.
    let state = ExecutorState::new(String::new(), DEFAULT_PERMISSION_TIMEOUT);
    let handler = Arc::new(ExecutorHandler { state: Arc::clone(&state) });

    let (stream, _addr) = listener
        .accept()
        .await
        .map_err(|e| ExecutorError::Transport(agor_wire::ProtocolError::Io(e)))?;
    let peer = RpcPeer::spawn(stream, handler, DEFAULT_RPC_TIMEOUT);
    state.set_peer(peer.clone());
    info!("daemon connected");

    // Serve until the daemon asks for shutdown or hangs up.
    loop {
        tokio::select! {
            _ = state.shutdown.notified() => {
                info!("shutdown requested");
                // The shutdown response is written by a concurrent task;
                // let it flush before closing the write half.
                tokio::time::sleep(Duration::from_millis(50)).await;
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {
                if peer.is_closed() {
                    warn!("daemon connection closed");
                    break;
                }
            }
        }
    }
    peer.close().await;
    Ok(())
}

/// Feathers mode: connect out to the daemon and run the task given on the
/// command line, then exit.
pub async fn run_feathers_mode(mode: StartMode) -> Result<(), ExecutorError> {
    let StartMode::Feathers {
        session_token,
        session_id,
        task_id,
        prompt,
        tool,
        permission_mode,
        daemon_url,
        cwd,
    } = mode
    else {
        return Err(ExecutorError::BadArgs("not feathers mode".into()));
    };

    let state = ExecutorState::new(session_token.clone(), DEFAULT_PERMISSION_TIMEOUT);
    let handler = Arc::new(ExecutorHandler { state: Arc::clone(&state) });

    let stream = connect_socket(&daemon_url).await?;
    let peer = RpcPeer::spawn(stream, handler, DEFAULT_RPC_TIMEOUT);
    state.set_peer(peer.clone());
    info!(session_id = %session_id, task_id = %task_id, "connected to daemon");

    let cwd = match cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()
            .map_err(|e| ExecutorError::BadArgs(format!("no working directory: {e}")))?,
    };
    let params = ExecutePromptParams {
        session_token,
        session_id,
        task_id,
        agentic_tool: tool,
        prompt,
        cwd,
        tools: Vec::new(),
        permission_mode,
        timeout_ms: None,
        stream: true,
    };

    let result = state.run_prompt(params).await?;
    info!(status = %result.status, messages = result.message_count, "task finished");
    peer.close().await;
    Ok(())
}

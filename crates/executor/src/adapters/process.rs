// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared child-process driver for CLI-backed adapters.
//!
//! Spawns the vendor binary, streams stdout lines to the sink as chunks,
//! and kills the child when the cancellation token fires. The final
//! aggregated output becomes the adapter's outcome message.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{AdapterError, AdapterOutcome, StreamSink};

pub(super) struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: std::path::PathBuf,
}

/// Run the child to completion, streaming stdout lines.
pub(super) async fn drive(
    spec: ProcessSpec,
    sink: &dyn StreamSink,
    cancel: &CancellationToken,
) -> Result<AdapterOutcome, AdapterError> {
    let mut command = tokio::process::Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in &spec.env {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(AdapterError::Io)?;
    let stdout = child.stdout.take();

    sink.on_stream_start().await;
    let mut aggregated = String::new();

    if let Some(stdout) = stdout {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("adapter cancelled, killing child");
                    let _ = child.kill().await;
                    sink.on_stream_end().await;
                    return Err(AdapterError::Cancelled);
                }
                line = lines.next_line() => {
                    match line.map_err(AdapterError::Io)? {
                        Some(line) => {
                            aggregated.push_str(&line);
                            aggregated.push('\n');
                            sink.on_stream_chunk(&line).await;
                        }
                        None => break,
                    }
                }
            }
        }
    }

    let status = tokio::select! {
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            sink.on_stream_end().await;
            return Err(AdapterError::Cancelled);
        }
        status = child.wait() => status.map_err(AdapterError::Io)?,
    };

    if !status.success() {
        let detail = format!("{} exited with {:?}", spec.program, status.code());
        sink.on_stream_error(&detail).await;
        return Err(AdapterError::Tool(detail));
    }

    sink.on_stream_end().await;
    Ok(AdapterOutcome {
        message_count: 1,
        final_message: (!aggregated.is_empty()).then_some(aggregated),
        token_usage: None,
    })
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for command execution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Non-zero exit surfaced as an error (via the throwing wrapper or
    /// `exec_all`).
    #[error("command failed with exit code {exit_code}: {command}")]
    Failed { command: String, stdout: String, stderr: String, exit_code: i32 },

    #[error("failed to spawn {command}: {source}")]
    Spawn { command: String, source: std::io::Error },

    #[error("failed piping stdin to {command}: {source}")]
    Stdin { command: String, source: std::io::Error },

    /// `exec_with_input` on a runner that cannot carry stdin (sudo-cli).
    #[error("{runner} runner does not support stdin input")]
    UnsupportedInput { runner: &'static str },
}

impl CommandError {
    /// Exit code when the failure carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

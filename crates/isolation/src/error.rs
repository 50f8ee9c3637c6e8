// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the isolation layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsolationError {
    #[error("invalid unix username: {name:?}")]
    InvalidUsername { name: String },

    #[error("invalid worktree group name: {name:?}")]
    InvalidGroup { name: String },

    #[error(transparent)]
    Command(#[from] agor_shell::CommandError),

    #[error("filesystem error at {path}: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },
}

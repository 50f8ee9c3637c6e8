// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor failures. Any error escaping `main` exits non-zero; the
//! daemon observes the exit and fails the task.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error(transparent)]
    Transport(#[from] agor_wire::ProtocolError),

    #[error("adapter error: {0}")]
    Adapter(#[from] crate::adapters::AdapterError),

    #[error("daemon refused {method}: {detail}")]
    DaemonRefused { method: &'static str, detail: String },

    #[error("malformed payload for {method}: {detail}")]
    BadPayload { method: &'static str, detail: String },
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy for the control plane.
//!
//! Every subsystem error maps onto one of these kinds so the daemon can
//! answer callers uniformly (HTTP-equivalent status, task failure body).

use serde::{Deserialize, Serialize};

/// Classification of a control-plane failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Validation failure; fail fast.
    InvalidInput,
    /// Missing or expired token.
    Unauthenticated,
    /// Permission rank too low, or an immutability violation.
    Forbidden,
    /// RPC, stop-ACK, stop-complete, permission, or socket wait expired.
    Timeout,
    /// Non-zero subprocess exit.
    CommandFailed,
    /// Peer disconnected during a pending request.
    TransportClosed,
    /// Stop ACK never received; force-stop path taken.
    ExecutorUnresponsive,
    /// Attempt to change an immutable field.
    Conflict,
    /// Session, worktree, task, or user does not exist.
    NotFound,
}

crate::simple_display! {
    ErrorKind {
        InvalidInput => "invalid_input",
        Unauthenticated => "unauthenticated",
        Forbidden => "forbidden",
        Timeout => "timeout",
        CommandFailed => "command_failed",
        TransportClosed => "transport_closed",
        ExecutorUnresponsive => "executor_unresponsive",
        Conflict => "conflict",
        NotFound => "not_found",
    }
}

/// Structured error payload surfaced to users (final system message,
/// failed-task body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

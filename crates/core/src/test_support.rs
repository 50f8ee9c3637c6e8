// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for tests in this crate and downstream crates.

use crate::{AgorConfig, Session, SessionStatus, Task, TaskStatus};

/// Config with near-instant timeouts so timeout paths can be exercised
/// without real waiting.
pub fn fast_config() -> AgorConfig {
    let mut config = AgorConfig::default();
    config.limits.rpc_timeout_ms = 200;
    config.limits.stop_ack_timeout_ms = 50;
    config.limits.stop_complete_timeout_ms = 100;
    config.limits.permission_timeout_ms = 100;
    config.limits.socket_wait_timeout_ms = 500;
    config.auth.secret = "test-secret".to_string();
    config
}

/// A session mid-run, paired with its running task.
pub fn running_pair() -> (Session, Task) {
    let session = Session::builder().status(SessionStatus::Running).build();
    let task = Task::builder().status(TaskStatus::Running).build();
    let task = Task { session_id: session.id, ..task };
    (session, task)
}

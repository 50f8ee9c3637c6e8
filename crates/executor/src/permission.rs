// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission broker, executor side.
//!
//! A process-wide registry of open decisions keyed by request id. Each
//! waiter is a oneshot resolved by the daemon's `permission_resolved`
//! notification, by timeout (auto-deny, reason "Timeout"), or by task /
//! session cancellation (deny, reason "Cancelled"). The first deny in a
//! session proactively cancels that session's other pending requests.

use std::collections::HashMap;
use std::time::Duration;

use agor_core::{SessionId, TaskId};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome of one permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allow: bool,
    pub reason: Option<String>,
}

impl Decision {
    pub fn allowed() -> Self {
        Self { allow: true, reason: None }
    }

    pub fn denied(reason: &str) -> Self {
        Self { allow: false, reason: Some(reason.to_string()) }
    }
}

struct PendingDecision {
    session_id: SessionId,
    task_id: TaskId,
    tx: oneshot::Sender<Decision>,
}

/// All open decisions across sessions, one instance per executor process.
#[derive(Default)]
pub struct PermissionManager {
    pending: Mutex<HashMap<String, PendingDecision>>,
}

impl PermissionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter and block until resolution or timeout.
    pub async fn wait_for_decision(
        &self,
        request_id: &str,
        session_id: SessionId,
        task_id: TaskId,
        timeout: Duration,
    ) -> Decision {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(
            request_id.to_string(),
            PendingDecision { session_id, task_id, tx },
        );

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(decision)) => decision,
            // Sender dropped without a decision
            Ok(Err(_)) => Decision::denied("Cancelled"),
            Err(_) => {
                self.pending.lock().remove(request_id);
                debug!(request_id, "permission request timed out");
                Decision::denied("Timeout")
            }
        }
    }

    /// Resolve one request. On a deny, all other pending requests of the
    /// same session are cancelled.
    pub fn resolve(&self, request_id: &str, allow: bool, reason: Option<String>) -> bool {
        let entry = self.pending.lock().remove(request_id);
        let Some(entry) = entry else {
            warn!(request_id, "permission_resolved for unknown request");
            return false;
        };

        let session_id = entry.session_id;
        let _ = entry.tx.send(Decision { allow, reason });

        if !allow {
            self.cancel_session(&session_id);
        }
        true
    }

    /// Cancel every pending request of a task (the task is stopping).
    pub fn cancel_task(&self, task_id: &TaskId) {
        let drained: Vec<_> = {
            let mut pending = self.pending.lock();
            let ids: Vec<String> = pending
                .iter()
                .filter(|(_, p)| p.task_id == *task_id)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter().filter_map(|id| pending.remove(&id)).collect()
        };
        for entry in drained {
            let _ = entry.tx.send(Decision::denied("Cancelled"));
        }
    }

    /// Cancel every pending request of a session.
    fn cancel_session(&self, session_id: &SessionId) {
        let drained: Vec<_> = {
            let mut pending = self.pending.lock();
            let ids: Vec<String> = pending
                .iter()
                .filter(|(_, p)| p.session_id == *session_id)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter().filter_map(|id| pending.remove(&id)).collect()
        };
        for entry in drained {
            let _ = entry.tx.send(Decision::denied("Cancelled"));
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity and its status state machine.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a single prompt→completion run.
    pub struct TaskId("tsk-");
}

/// Task execution status.
///
/// Valid transitions: `Pending → Running → {Completed, Failed}` and
/// `Running → Stopping → Stopped`. Terminal states never transition further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Stopping,
    Completed,
    Failed,
    Stopped,
}

impl TaskStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Stopped)
    }

    /// Whether moving to `next` is a legal state-machine edge.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Stopping)
                | (TaskStatus::Stopping, TaskStatus::Stopped)
        )
    }
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Running => "running",
        Stopping => "stopping",
        Completed => "completed",
        Failed => "failed",
        Stopped => "stopped",
    }
}

/// One prompt→completion unit inside a session.
///
/// `sequence` is monotonic per session. A running executor process is
/// exclusively owned by the task it was spawned for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub session_id: crate::SessionId,
    pub sequence: u64,
    pub prompt: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::ErrorBody>,
    /// Set while a tool-use permission request is pending on this task.
    #[serde(default)]
    pub awaiting_permission: bool,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
}

crate::builder! {
    pub struct TaskBuilder => Task {
        into { prompt: String = "do the thing" }
        set {
            sequence: u64 = 1,
            status: TaskStatus = TaskStatus::Pending,
            awaiting_permission: bool = false,
        }
        option {
            error: crate::ErrorBody = None,
            completed_at_ms: u64 = None,
        }
        computed {
            id: TaskId = TaskId::new(),
            session_id: crate::SessionId = crate::SessionId::new(),
            created_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

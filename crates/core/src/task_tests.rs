// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    completed = { TaskStatus::Completed },
    failed = { TaskStatus::Failed },
    stopped = { TaskStatus::Stopped },
)]
fn terminal_states_admit_no_transitions(status: TaskStatus) {
    assert!(status.is_terminal());
    for next in [
        TaskStatus::Pending,
        TaskStatus::Running,
        TaskStatus::Stopping,
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::Stopped,
    ] {
        assert!(!status.can_transition_to(next), "{status} -> {next} must be illegal");
    }
}

#[parameterized(
    pending_to_running = { TaskStatus::Pending, TaskStatus::Running, true },
    running_to_completed = { TaskStatus::Running, TaskStatus::Completed, true },
    running_to_failed = { TaskStatus::Running, TaskStatus::Failed, true },
    running_to_stopping = { TaskStatus::Running, TaskStatus::Stopping, true },
    stopping_to_stopped = { TaskStatus::Stopping, TaskStatus::Stopped, true },
    pending_to_completed = { TaskStatus::Pending, TaskStatus::Completed, false },
    stopping_to_completed = { TaskStatus::Stopping, TaskStatus::Completed, false },
    running_to_stopped = { TaskStatus::Running, TaskStatus::Stopped, false },
)]
fn task_transitions(from: TaskStatus, to: TaskStatus, legal: bool) {
    assert_eq!(from.can_transition_to(to), legal);
}

#[test]
fn non_terminal_states() {
    assert!(!TaskStatus::Pending.is_terminal());
    assert!(!TaskStatus::Running.is_terminal());
    assert!(!TaskStatus::Stopping.is_terminal());
}

#[test]
fn builder_defaults() {
    let task = Task::builder().build();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.sequence, 1);
    assert!(task.completed_at_ms.is_none());
    assert!(!task.awaiting_permission);
}

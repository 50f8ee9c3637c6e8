// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task writers.
//!
//! The task writer never sets `ready_for_prompt`: for stopped tasks that
//! flag belongs to the stop protocol alone, and for completed tasks to the
//! queue runner. Nothing in this module touches the sessions map.

use agor_core::{ErrorBody, Task, TaskId, TaskStatus};

use super::{MaterializedState, StorageError};

impl MaterializedState {
    /// Create the next task for a session with a monotonic sequence.
    ///
    /// Rejected while another task of the session is still in flight, which
    /// keeps the one-running-task invariant at the write side.
    pub fn create_task(
        &mut self,
        session_id: agor_core::SessionId,
        prompt: impl Into<String>,
        now_ms: u64,
    ) -> Result<&Task, StorageError> {
        self.session(&session_id)?;
        if let Some(running) = self.running_task_for_session(&session_id) {
            return Err(StorageError::TaskInFlight { session_id, task_id: running.id });
        }

        let sequence = self
            .tasks
            .values()
            .filter(|t| t.session_id == session_id)
            .map(|t| t.sequence)
            .max()
            .unwrap_or(0)
            + 1;

        let task = Task {
            id: TaskId::new(),
            session_id,
            sequence,
            prompt: prompt.into(),
            status: TaskStatus::Pending,
            error: None,
            awaiting_permission: false,
            created_at_ms: now_ms,
            completed_at_ms: None,
        };
        let id = task.id;
        self.tasks.insert(id, task);
        Ok(&self.tasks[&id])
    }

    pub fn task(&self, id: &TaskId) -> Result<&Task, StorageError> {
        self.tasks
            .get(id)
            .ok_or(StorageError::NotFound { entity: "task", id: id.to_string() })
    }

    /// Move a task along a legal state-machine edge. Terminal targets stamp
    /// `completed_at_ms`.
    pub fn update_task_status(
        &mut self,
        id: &TaskId,
        next: TaskStatus,
        now_ms: u64,
    ) -> Result<&Task, StorageError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or(StorageError::NotFound { entity: "task", id: id.to_string() })?;

        if task.status.is_terminal() {
            return Err(StorageError::TerminalTask { id: *id, status: task.status.to_string() });
        }
        if !task.status.can_transition_to(next) {
            return Err(StorageError::IllegalTransition {
                entity: "task",
                from: task.status.to_string(),
                to: next.to_string(),
            });
        }

        task.status = next;
        if next.is_terminal() {
            task.completed_at_ms = Some(now_ms);
            task.awaiting_permission = false;
        }
        Ok(task)
    }

    /// Record the structured error on a failed task.
    pub fn set_task_error(
        &mut self,
        id: &TaskId,
        error: ErrorBody,
    ) -> Result<(), StorageError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or(StorageError::NotFound { entity: "task", id: id.to_string() })?;
        task.error = Some(error);
        Ok(())
    }

    /// Flag flip while a permission request is pending on the task.
    pub fn set_awaiting_permission(
        &mut self,
        id: &TaskId,
        awaiting: bool,
    ) -> Result<(), StorageError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or(StorageError::NotFound { entity: "task", id: id.to_string() })?;
        if !task.status.is_terminal() {
            task.awaiting_permission = awaiting;
        }
        Ok(())
    }
}

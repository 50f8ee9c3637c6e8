// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message writers.

use agor_core::{Message, MessageId, Role, TaskId};

use super::{MaterializedState, StorageError};

impl MaterializedState {
    /// Append a transcript message to a task.
    ///
    /// Messages are immutable once persisted and refused after the task
    /// reached a terminal state: the transcript is closed with the task.
    pub fn append_message(
        &mut self,
        task_id: &TaskId,
        role: Role,
        content: impl Into<String>,
        now_ms: u64,
    ) -> Result<&Message, StorageError> {
        let task = self.task(task_id)?;
        if task.status.is_terminal() {
            return Err(StorageError::TerminalTask {
                id: *task_id,
                status: task.status.to_string(),
            });
        }
        let session_id = task.session_id;

        let entries = self.messages.entry(*task_id).or_default();
        let sequence = entries.last().map(|m| m.sequence).unwrap_or(0) + 1;
        entries.push(Message {
            id: MessageId::new(),
            task_id: *task_id,
            session_id,
            sequence,
            role,
            content: content.into(),
            created_at_ms: now_ms,
        });
        Ok(entries.last().unwrap_or_else(|| unreachable!("pushed above")))
    }

    /// All messages of a task in sequence order.
    pub fn messages_for_task(&self, task_id: &TaskId) -> &[Message] {
        self.messages.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

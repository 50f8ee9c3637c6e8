// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state: every entity map plus the writers that keep the
//! invariants.

mod messages;
mod sessions;
mod tasks;
mod users;
mod worktrees;

use std::collections::{HashMap, HashSet};

use agor_core::{
    CredentialKey, Message, Repo, RepoId, Session, SessionId, Task, TaskId, User, UserId,
    Worktree, WorktreeId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sessions::SessionPatch;

/// Errors from state mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("illegal {entity} transition: {from} -> {to}")]
    IllegalTransition { entity: &'static str, from: String, to: String },

    #[error("task {id} is terminal ({status}); no further writes accepted")]
    TerminalTask { id: TaskId, status: String },

    #[error("session {session_id} already has a task in flight: {task_id}")]
    TaskInFlight { session_id: SessionId, task_id: TaskId },
}

/// The whole control-plane state, one instance per daemon, guarded by a
/// single mutex at the daemon layer.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub users: HashMap<UserId, User>,
    pub repos: HashMap<RepoId, Repo>,
    pub worktrees: HashMap<WorktreeId, Worktree>,
    pub(crate) worktree_owners: HashMap<WorktreeId, HashSet<UserId>>,
    pub sessions: HashMap<SessionId, Session>,
    pub tasks: HashMap<TaskId, Task>,
    pub(crate) messages: HashMap<TaskId, Vec<Message>>,
    pub(crate) credentials: HashMap<UserId, HashMap<CredentialKey, String>>,
}

impl MaterializedState {
    /// The single task in RUNNING or STOPPING for a session, if any.
    ///
    /// Invariant: a session in RUNNING/STOPPING has exactly one such task;
    /// the task writers reject creating a second.
    pub fn running_task_for_session(&self, session_id: &SessionId) -> Option<&Task> {
        self.tasks.values().find(|t| {
            t.session_id == *session_id
                && matches!(
                    t.status,
                    agor_core::TaskStatus::Running | agor_core::TaskStatus::Stopping
                )
        })
    }
}

#[cfg(test)]
#[path = "../state_tests.rs"]
mod tests;

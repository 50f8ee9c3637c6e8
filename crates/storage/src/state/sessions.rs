// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session writers.
//!
//! A patch can express status, `ready_for_prompt`, and archival — and
//! nothing else. `created_by` and `unix_username` have no patch fields, so
//! immutability holds structurally at this layer; the API-facing check
//! (rejecting a patch that names them) lives in the authorization hooks.

use agor_core::{Session, SessionId, SessionStatus};

use super::{MaterializedState, StorageError};

/// Mutable subset of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub ready_for_prompt: Option<bool>,
    pub archived: Option<bool>,
}

impl SessionPatch {
    pub fn status(status: SessionStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn with_ready_for_prompt(mut self, ready: bool) -> Self {
        self.ready_for_prompt = Some(ready);
        self
    }
}

impl MaterializedState {
    pub fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.id, session);
    }

    pub fn session(&self, id: &SessionId) -> Result<&Session, StorageError> {
        self.sessions
            .get(id)
            .ok_or(StorageError::NotFound { entity: "session", id: id.to_string() })
    }

    /// Apply a patch, validating any status change against the session
    /// state machine.
    pub fn patch_session(
        &mut self,
        id: &SessionId,
        patch: SessionPatch,
    ) -> Result<&Session, StorageError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or(StorageError::NotFound { entity: "session", id: id.to_string() })?;

        if let Some(next) = patch.status {
            if !session.status.can_transition_to(next) {
                return Err(StorageError::IllegalTransition {
                    entity: "session",
                    from: session.status.to_string(),
                    to: next.to_string(),
                });
            }
            session.status = next;
        }
        if let Some(ready) = patch.ready_for_prompt {
            session.ready_for_prompt = ready;
        }
        if let Some(archived) = patch.archived {
            session.archived = archived;
        }
        Ok(session)
    }
}

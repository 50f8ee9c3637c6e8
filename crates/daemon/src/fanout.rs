// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming fan-out (presence/streaming pub/sub).
//!
//! Per-session broadcast channels with a single writer (the executor via
//! the daemon) and many authenticated readers, plus per-user terminal
//! channels keyed `user/<user_id>/terminal`. Events are ephemeral: a
//! subscriber that joins late starts from the next event; nothing is
//! persisted.

use std::collections::HashMap;

use agor_core::{ChannelEvent, PermissionLevel, SessionId, TokenClaims, TokenRole, UserId};
use agor_storage::MaterializedState;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("invalid channel name: {0}")]
    InvalidChannel(String),
}

/// Owns every live channel.
#[derive(Default)]
pub struct ChannelHub {
    sessions: Mutex<HashMap<SessionId, broadcast::Sender<ChannelEvent>>>,
    users: Mutex<HashMap<UserId, broadcast::Sender<ChannelEvent>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn session_sender(&self, session_id: SessionId) -> broadcast::Sender<ChannelEvent> {
        self.sessions
            .lock()
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    fn user_sender(&self, user_id: UserId) -> broadcast::Sender<ChannelEvent> {
        self.users
            .lock()
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish onto the event's session channel. Events without a session
    /// scope are dropped here (terminal I/O goes through
    /// [`publish_terminal`](Self::publish_terminal)).
    pub fn publish(&self, event: ChannelEvent) {
        let Some(session_id) = event.session_id().copied() else {
            debug!(event = event.name(), "dropping session-less event");
            return;
        };
        // Send errors mean no subscribers; streaming is best-effort
        let _ = self.session_sender(session_id).send(event);
    }

    /// Publish PTY bytes to the user's terminal channel; every subscriber
    /// of that channel sees the echo.
    pub fn publish_terminal(&self, user_id: UserId, data: String) {
        let _ = self.user_sender(user_id).send(ChannelEvent::TerminalIo { user_id, data });
    }

    /// Subscribe to a session channel.
    ///
    /// User tokens need at least `view` on the session's worktree; service
    /// tokens are accepted only for their own session.
    pub fn subscribe_session(
        &self,
        state: &MaterializedState,
        claims: &TokenClaims,
        session_id: SessionId,
    ) -> Result<broadcast::Receiver<ChannelEvent>, SubscribeError> {
        match claims.role {
            TokenRole::Service => {
                if claims.session_id != session_id {
                    return Err(SubscribeError::Forbidden(
                        "service token is scoped to another session".into(),
                    ));
                }
            }
            TokenRole::User => {
                let session = state
                    .session(&session_id)
                    .map_err(|_| SubscribeError::SessionNotFound(session_id))?;
                let effective = state
                    .effective_permission(&session.worktree_id, &claims.user_id)
                    .map_err(|e| SubscribeError::Forbidden(e.to_string()))?;
                if !effective.allows(PermissionLevel::View) {
                    return Err(SubscribeError::Forbidden(format!(
                        "requires view on worktree {}",
                        session.worktree_id
                    )));
                }
            }
        }
        Ok(self.session_sender(session_id).subscribe())
    }

    /// Subscribe to a terminal channel. Only joins whose name matches
    /// `user/<user_id>/terminal` for the token's own user are accepted.
    pub fn subscribe_terminal(
        &self,
        claims: &TokenClaims,
        channel: &str,
    ) -> Result<broadcast::Receiver<ChannelEvent>, SubscribeError> {
        let expected = format!("user/{}/terminal", claims.user_id);
        if channel != expected {
            return Err(SubscribeError::InvalidChannel(channel.to_string()));
        }
        Ok(self.user_sender(claims.user_id).subscribe())
    }

    /// Unauthenticated subscription for in-process consumers (the stop
    /// protocol awaiting ACKs).
    pub(crate) fn subscribe_internal(
        &self,
        session_id: SessionId,
    ) -> broadcast::Receiver<ChannelEvent> {
        self.session_sender(session_id).subscribe()
    }

    /// Drop a session channel once its session is archived.
    pub fn drop_session(&self, session_id: &SessionId) {
        self.sessions.lock().remove(session_id);
    }

    /// Number of live subscribers on a session channel.
    pub fn subscriber_count(&self, session_id: &SessionId) -> usize {
        self.sessions
            .lock()
            .get(session_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;

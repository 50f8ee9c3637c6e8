// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel event families carried on the streaming fan-out.
//!
//! All of these are ephemeral: they are delivered to live subscribers in
//! emission order and never persisted. The canonical transcript is the
//! final `Message` each adapter writes.

use serde::{Deserialize, Serialize};

use crate::{MessageId, Role, SessionId, TaskId, UserId};

/// An event published on a session or user channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelEvent {
    StreamingStart {
        message_id: MessageId,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        role: Role,
    },
    StreamingChunk {
        message_id: MessageId,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        role: Role,
        chunk: String,
    },
    StreamingEnd {
        message_id: MessageId,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        role: Role,
    },
    StreamingError {
        message_id: MessageId,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        role: Role,
        error: String,
    },

    ThinkingStart { session_id: SessionId, task_id: TaskId },
    ThinkingChunk { session_id: SessionId, task_id: TaskId, chunk: String },
    ThinkingEnd { session_id: SessionId, task_id: TaskId },

    // Control plane for the stop protocol. Sequence numbers distinguish
    // retries; handlers match on (task_id, sequence), never task_id alone.
    TaskStop { session_id: SessionId, task_id: TaskId, sequence: u64, timestamp: u64 },
    TaskStopAck {
        session_id: SessionId,
        task_id: TaskId,
        sequence: u64,
        received_at: u64,
        status: StopAckStatus,
    },
    TaskStoppedComplete { session_id: SessionId, task_id: TaskId, stopped_at: u64 },

    PermissionRequest {
        session_id: SessionId,
        request_id: String,
        task_id: TaskId,
        tool_name: String,
        tool_input: serde_json::Value,
        timestamp: u64,
    },
    PermissionResolved {
        session_id: SessionId,
        request_id: String,
        task_id: TaskId,
        allow: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        remember: bool,
        scope: PermissionScope,
        decided_by: String,
    },

    // Presence passes through the same transport; out of core scope.
    CursorMoved { session_id: SessionId, user_id: UserId, x: f64, y: f64 },
    CursorLeft { session_id: SessionId, user_id: UserId },

    /// PTY bytes on a `user/<user_id>/terminal` channel, echoed to the
    /// whole channel.
    TerminalIo { user_id: UserId, data: String },
}

/// Executor's answer to a `task_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopAckStatus {
    Stopping,
    AlreadyStopped,
}

crate::simple_display! {
    StopAckStatus {
        Stopping => "stopping",
        AlreadyStopped => "already_stopped",
    }
}

/// Remembered scope of a permission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    Once,
    Session,
    Project,
    User,
    Local,
}

crate::simple_display! {
    PermissionScope {
        Once => "once",
        Session => "session",
        Project => "project",
        User => "user",
        Local => "local",
    }
}

impl ChannelEvent {
    /// Session the event belongs to, when session-scoped.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            ChannelEvent::StreamingStart { session_id, .. }
            | ChannelEvent::StreamingChunk { session_id, .. }
            | ChannelEvent::StreamingEnd { session_id, .. }
            | ChannelEvent::StreamingError { session_id, .. }
            | ChannelEvent::ThinkingStart { session_id, .. }
            | ChannelEvent::ThinkingChunk { session_id, .. }
            | ChannelEvent::ThinkingEnd { session_id, .. }
            | ChannelEvent::TaskStop { session_id, .. }
            | ChannelEvent::TaskStopAck { session_id, .. }
            | ChannelEvent::TaskStoppedComplete { session_id, .. }
            | ChannelEvent::PermissionRequest { session_id, .. }
            | ChannelEvent::PermissionResolved { session_id, .. }
            | ChannelEvent::CursorMoved { session_id, .. }
            | ChannelEvent::CursorLeft { session_id, .. } => Some(session_id),
            ChannelEvent::TerminalIo { .. } => None,
        }
    }

    /// Short tag for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelEvent::StreamingStart { .. } => "streaming:start",
            ChannelEvent::StreamingChunk { .. } => "streaming:chunk",
            ChannelEvent::StreamingEnd { .. } => "streaming:end",
            ChannelEvent::StreamingError { .. } => "streaming:error",
            ChannelEvent::ThinkingStart { .. } => "thinking:start",
            ChannelEvent::ThinkingChunk { .. } => "thinking:chunk",
            ChannelEvent::ThinkingEnd { .. } => "thinking:end",
            ChannelEvent::TaskStop { .. } => "task_stop",
            ChannelEvent::TaskStopAck { .. } => "task_stop_ack",
            ChannelEvent::TaskStoppedComplete { .. } => "task_stopped_complete",
            ChannelEvent::PermissionRequest { .. } => "permission:request",
            ChannelEvent::PermissionResolved { .. } => "permission:resolved",
            ChannelEvent::CursorMoved { .. } => "cursor-moved",
            ChannelEvent::CursorLeft { .. } => "cursor-left",
            ChannelEvent::TerminalIo { .. } => "terminal:io",
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;

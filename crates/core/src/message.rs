// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message entity.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a transcript message.
    pub struct MessageId("msg-");
}

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

crate::simple_display! {
    Role {
        User => "user",
        Assistant => "assistant",
        System => "system",
        Tool => "tool",
    }
}

/// An ordered transcript entry inside a task. Immutable once persisted.
///
/// Streaming chunks are never persisted individually; only the final
/// aggregated messages reach this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub task_id: crate::TaskId,
    pub session_id: crate::SessionId,
    pub sequence: u64,
    pub role: Role,
    pub content: String,
    pub created_at_ms: u64,
}

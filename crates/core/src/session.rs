// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session entity and its status state machine.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an agent conversation.
    pub struct SessionId("ses-");
}

/// Which agent product drives a session's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgenticTool {
    ClaudeCode,
    Codex,
    Gemini,
    OpenCode,
}

impl AgenticTool {
    /// The credential key the executor requests for this tool.
    pub fn credential_key(self) -> crate::CredentialKey {
        match self {
            AgenticTool::ClaudeCode => crate::CredentialKey::AnthropicApiKey,
            AgenticTool::Codex => crate::CredentialKey::OpenAiApiKey,
            AgenticTool::Gemini => crate::CredentialKey::GeminiApiKey,
            AgenticTool::OpenCode => crate::CredentialKey::None,
        }
    }
}

crate::simple_display! {
    AgenticTool {
        ClaudeCode => "claude-code",
        Codex => "codex",
        Gemini => "gemini",
        OpenCode => "opencode",
    }
}

/// Session execution status.
///
/// Valid transitions: `Idle ⇄ Running`, `Running → Stopping → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Running,
    Stopping,
}

impl SessionStatus {
    /// Whether moving to `next` is a legal state-machine edge.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Idle, SessionStatus::Running)
                | (SessionStatus::Running, SessionStatus::Idle)
                | (SessionStatus::Running, SessionStatus::Stopping)
                | (SessionStatus::Stopping, SessionStatus::Idle)
        )
    }
}

crate::simple_display! {
    SessionStatus {
        Idle => "idle",
        Running => "running",
        Stopping => "stopping",
    }
}

/// An agent conversation bound to exactly one worktree.
///
/// `created_by` and `unix_username` are immutable after creation: agent SDK
/// state lives in the creator's home directory, and running a later task as
/// a different Unix user would corrupt or leak it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub worktree_id: crate::WorktreeId,
    pub created_by: crate::UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix_username: Option<String>,
    pub agentic_tool: AgenticTool,
    pub status: SessionStatus,
    /// Gates auto-start of queued prompts. Cleared by every user-initiated
    /// stop; only the stop protocol and the queue runner may set it.
    pub ready_for_prompt: bool,
    pub archived: bool,
    pub created_at_ms: u64,
}

crate::builder! {
    pub struct SessionBuilder => Session {
        set {
            agentic_tool: AgenticTool = AgenticTool::ClaudeCode,
            status: SessionStatus = SessionStatus::Idle,
            ready_for_prompt: bool = false,
            archived: bool = false,
        }
        option { unix_username: String = None }
        computed {
            id: SessionId = SessionId::new(),
            worktree_id: crate::WorktreeId = crate::WorktreeId::new(),
            created_by: crate::UserId = crate::UserId::new(),
            created_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

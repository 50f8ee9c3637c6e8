// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed payloads for every daemon ⇄ executor method.
//!
//! Method name constants live in [`method`] (requests) and
//! [`notification`]; payload structs (de)serialize with `serde_json`.

use agor_core::{
    AgenticTool, CredentialKey, PermissionScope, SessionId, StopAckStatus, TaskId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Request method names.
pub mod method {
    pub const PING: &str = "ping";
    pub const GET_API_KEY: &str = "get_api_key";
    pub const REQUEST_PERMISSION: &str = "request_permission";
    pub const EXECUTE_PROMPT: &str = "execute_prompt";
    pub const SHUTDOWN: &str = "shutdown";
}

/// Notification method names.
pub mod notification {
    pub const REPORT_MESSAGE: &str = "report_message";
    pub const DAEMON_COMMAND: &str = "daemon_command";
    pub const PERMISSION_RESOLVED: &str = "permission_resolved";
    pub const TASK_STOP: &str = "task_stop";
    pub const TASK_STOP_ACK: &str = "task_stop_ack";
    pub const TASK_STOPPED_COMPLETE: &str = "task_stopped_complete";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    pub pong: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetApiKeyParams {
    pub session_token: String,
    pub credential_key: CredentialKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetApiKeyResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPermissionParams {
    pub session_token: String,
    pub task_id: TaskId,
    pub tool_name: String,
    pub tool_params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPermissionResult {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutePromptParams {
    pub session_token: String,
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub agentic_tool: AgenticTool,
    pub prompt: String,
    pub cwd: PathBuf,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub stream: bool,
}

/// Terminal disposition of an `execute_prompt` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteStatus {
    Completed,
    Failed,
    Cancelled,
}

agor_core::simple_display! {
    ExecuteStatus {
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_tokens: Option<u64>,
}

/// Error detail carried inside an `execute_prompt` result (distinct from a
/// transport-level RPC error: the call succeeded, the tool run failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutePromptResult {
    pub status: ExecuteStatus,
    pub message_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutdownParams {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMessageParams {
    pub session_token: String,
    pub task_id: TaskId,
    pub sequence: u64,
    pub timestamp: u64,
    pub event_type: String,
    pub event_data: Value,
}

/// Sub-commands multiplexed over the `daemon_command` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonCommand {
    CreateMessage,
    UpdateSession,
    UpdateTask,
    GetMessages,
    GetSession,
    StreamStart,
    StreamChunk,
    ThinkingStart,
    ThinkingChunk,
    ThinkingEnd,
    EmitPermissionEvent,
}

agor_core::simple_display! {
    DaemonCommand {
        CreateMessage => "create_message",
        UpdateSession => "update_session",
        UpdateTask => "update_task",
        GetMessages => "get_messages",
        GetSession => "get_session",
        StreamStart => "stream_start",
        StreamChunk => "stream_chunk",
        ThinkingStart => "thinking_start",
        ThinkingChunk => "thinking_chunk",
        ThinkingEnd => "thinking_end",
        EmitPermissionEvent => "emit_permission_event",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonCommandParams {
    pub session_token: String,
    pub command: DaemonCommand,
    pub data: Value,
}

/// Human decision forwarded to the executor. Field names keep the UI's
/// camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResolvedParams {
    pub request_id: String,
    pub task_id: TaskId,
    pub allow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub remember: bool,
    pub scope: PermissionScope,
    pub decided_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStopParams {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub sequence: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStopAckParams {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub sequence: u64,
    pub received_at: u64,
    pub status: StopAckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStoppedCompleteParams {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub stopped_at: u64,
}

#[cfg(test)]
#[path = "methods_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool adapters: one pluggable back-end per agent product.
//!
//! Each adapter drives its vendor CLI and maps output into the uniform
//! streaming callbacks. The concrete wire formats stay inside the
//! adapters; everything above sees `ToolAdapter`.

mod claude;
mod codex;
mod gemini;
mod opencode;
mod process;

#[cfg(any(test, feature = "test-support"))]
mod fake;

use std::path::PathBuf;
use std::time::Duration;

use agor_core::{AgenticTool, SessionId, TaskId};
use agor_wire::TokenUsage;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use claude::ClaudeCodeAdapter;
pub use codex::CodexAdapter;
pub use gemini::GeminiAdapter;
pub use opencode::OpenCodeAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeScript, FakeToolAdapter};

/// Everything an adapter needs to run one task.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub prompt: String,
    pub cwd: PathBuf,
    pub api_key: Option<String>,
    pub permission_mode: Option<String>,
    pub timeout: Option<Duration>,
}

/// Uniform streaming callbacks. The runtime's sink forwards these to the
/// daemon as `daemon_command` notifications; tests install a recorder.
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn on_stream_start(&self);
    async fn on_stream_chunk(&self, chunk: &str);
    async fn on_stream_end(&self);
    async fn on_stream_error(&self, error: &str);
    async fn on_thinking_start(&self);
    async fn on_thinking_chunk(&self, chunk: &str);
    async fn on_thinking_end(&self);

    /// Tool-use approval gate. Returns false when denied (timeout and
    /// cancellation are denials).
    async fn request_permission(&self, tool_name: &str, tool_input: serde_json::Value) -> bool;
}

/// What a finished adapter run reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterOutcome {
    pub message_count: u64,
    pub final_message: Option<String>,
    pub token_usage: Option<TokenUsage>,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The run was aborted via the cancellation token. Not a failure:
    /// the runtime maps this to a cancelled status.
    #[error("cancelled")]
    Cancelled,

    #[error("tool process failed: {0}")]
    Tool(String),

    #[error("tool I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// A pluggable agent back-end.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        input: &TaskInput,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<AdapterOutcome, AdapterError>;
}

/// Select the adapter for a session's tool.
pub fn adapter_for(tool: AgenticTool) -> Box<dyn ToolAdapter> {
    match tool {
        AgenticTool::ClaudeCode => Box::new(ClaudeCodeAdapter),
        AgenticTool::Codex => Box::new(CodexAdapter),
        AgenticTool::Gemini => Box::new(GeminiAdapter),
        AgenticTool::OpenCode => Box::new(OpenCodeAdapter),
    }
}

#[cfg(test)]
#[path = "adapters_tests.rs"]
mod tests;

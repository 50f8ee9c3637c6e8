// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude Code adapter.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::process::{drive, ProcessSpec};
use super::{AdapterError, AdapterOutcome, StreamSink, TaskInput, ToolAdapter};

pub struct ClaudeCodeAdapter;

#[async_trait]
impl ToolAdapter for ClaudeCodeAdapter {
    fn name(&self) -> &'static str {
        "claude-code"
    }

    async fn run(
        &self,
        input: &TaskInput,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<AdapterOutcome, AdapterError> {
        let mut args = vec!["--print".to_string()];
        if let Some(ref mode) = input.permission_mode {
            args.push("--permission-mode".to_string());
            args.push(mode.clone());
        }
        args.push(input.prompt.clone());

        let mut env = Vec::new();
        if let Some(ref key) = input.api_key {
            env.push(("ANTHROPIC_API_KEY".to_string(), key.clone()));
        }

        drive(
            ProcessSpec { program: "claude".to_string(), args, env, cwd: input.cwd.clone() },
            sink,
            cancel,
        )
        .await
    }
}

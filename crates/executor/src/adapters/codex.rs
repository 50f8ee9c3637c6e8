// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codex adapter.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::process::{drive, ProcessSpec};
use super::{AdapterError, AdapterOutcome, StreamSink, TaskInput, ToolAdapter};

pub struct CodexAdapter;

#[async_trait]
impl ToolAdapter for CodexAdapter {
    fn name(&self) -> &'static str {
        "codex"
    }

    async fn run(
        &self,
        input: &TaskInput,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<AdapterOutcome, AdapterError> {
        let args = vec!["exec".to_string(), input.prompt.clone()];
        let mut env = Vec::new();
        if let Some(ref key) = input.api_key {
            env.push(("OPENAI_API_KEY".to_string(), key.clone()));
        }

        drive(
            ProcessSpec { program: "codex".to_string(), args, env, cwd: input.cwd.clone() },
            sink,
            cancel,
        )
        .await
    }
}

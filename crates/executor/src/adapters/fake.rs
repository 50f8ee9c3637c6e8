// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted adapter for tests: plays back chunks, optionally requests a
//! permission, optionally hangs until cancelled.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{AdapterError, AdapterOutcome, StreamSink, TaskInput, ToolAdapter};

/// What the fake should do on `run`.
#[derive(Debug, Clone, Default)]
pub struct FakeScript {
    /// Chunks to stream before finishing.
    pub chunks: Vec<String>,
    /// Ask for this tool permission before streaming; abort when denied.
    pub permission_tool: Option<String>,
    /// Never finish: wait for cancellation instead (stop-protocol tests).
    pub hang: bool,
    /// Fail with this message after streaming.
    pub fail_with: Option<String>,
}

#[derive(Default)]
pub struct FakeToolAdapter {
    script: FakeScript,
    inputs: Mutex<Vec<TaskInput>>,
}

impl FakeToolAdapter {
    pub fn new(script: FakeScript) -> Self {
        Self { script, inputs: Mutex::new(Vec::new()) }
    }

    /// Inputs observed by `run`, in order.
    pub fn inputs(&self) -> Vec<TaskInput> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl ToolAdapter for FakeToolAdapter {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn run(
        &self,
        input: &TaskInput,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<AdapterOutcome, AdapterError> {
        self.inputs.lock().push(input.clone());

        if let Some(ref tool) = self.script.permission_tool {
            let approved = sink
                .request_permission(tool, serde_json::json!({"prompt": input.prompt}))
                .await;
            if !approved {
                return Err(AdapterError::Tool(format!("permission denied for {tool}")));
            }
        }

        sink.on_stream_start().await;
        for chunk in &self.script.chunks {
            if cancel.is_cancelled() {
                return Err(AdapterError::Cancelled);
            }
            sink.on_stream_chunk(chunk).await;
        }

        if self.script.hang {
            cancel.cancelled().await;
            return Err(AdapterError::Cancelled);
        }

        if let Some(ref message) = self.script.fail_with {
            sink.on_stream_error(message).await;
            return Err(AdapterError::Tool(message.clone()));
        }

        sink.on_stream_end().await;
        Ok(AdapterOutcome {
            message_count: 1,
            final_message: Some(self.script.chunks.join("")),
            token_usage: None,
        })
    }
}

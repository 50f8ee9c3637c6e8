// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenCode adapter. Authenticates against a server URL instead of an API
//! key, so its credential key is `NONE`.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::process::{drive, ProcessSpec};
use super::{AdapterError, AdapterOutcome, StreamSink, TaskInput, ToolAdapter};

pub struct OpenCodeAdapter;

#[async_trait]
impl ToolAdapter for OpenCodeAdapter {
    fn name(&self) -> &'static str {
        "opencode"
    }

    async fn run(
        &self,
        input: &TaskInput,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> Result<AdapterOutcome, AdapterError> {
        let args = vec!["run".to_string(), input.prompt.clone()];
        let mut env = Vec::new();
        if let Ok(url) = std::env::var("OPENCODE_SERVER_URL") {
            if !url.is_empty() {
                env.push(("OPENCODE_SERVER_URL".to_string(), url));
            }
        }

        drive(
            ProcessSpec { program: "opencode".to_string(), args, env, cwd: input.cwd.clone() },
            sink,
            cancel,
        )
        .await
    }
}

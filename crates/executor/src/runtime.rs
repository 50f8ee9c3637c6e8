// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor runtime: one task, one RPC channel, one adapter run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use agor_core::{AgenticTool, Clock, SessionId, StopAckStatus, SystemClock, TaskId, TaskStatus};
use agor_wire::{
    method, notification, DaemonCommand, DaemonCommandParams, ExecutePromptParams,
    ExecutePromptResult, ExecuteStatus, GetApiKeyParams, GetApiKeyResult, PermissionResolvedParams,
    PingResult, RpcError, RpcHandler, RpcPeer, RpcErrorBody, TaskStopAckParams, TaskStopParams,
    TaskStoppedCompleteParams,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::{adapter_for, AdapterError, StreamSink, TaskInput};
use crate::error::ExecutorError;
use crate::permission::PermissionManager;

/// The run currently owned by this executor process.
pub struct CurrentRun {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub cancel: CancellationToken,
    /// Set once the stop path has patched the task, so the prompt runner
    /// does not double-finalize.
    stop_handled: AtomicBool,
}

/// Shared executor state: RPC peer slot, the current run, and the
/// permission registry.
pub struct ExecutorState {
    pub session_token: String,
    pub permissions: PermissionManager,
    pub shutdown: Notify,
    current: Mutex<Option<Arc<CurrentRun>>>,
    peer: OnceLock<RpcPeer>,
    permission_timeout: Duration,
    clock: SystemClock,
}

impl ExecutorState {
    pub fn new(session_token: String, permission_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            session_token,
            permissions: PermissionManager::new(),
            shutdown: Notify::new(),
            current: Mutex::new(None),
            peer: OnceLock::new(),
            permission_timeout,
            clock: SystemClock,
        })
    }

    /// Install the peer once the connection exists. Late to allow the
    /// handler to be constructed first.
    pub fn set_peer(&self, peer: RpcPeer) {
        let _ = self.peer.set(peer);
    }

    fn peer(&self) -> Result<&RpcPeer, ExecutorError> {
        self.peer.get().ok_or(ExecutorError::BadArgs("peer not connected".into()))
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub fn current_run(&self) -> Option<Arc<CurrentRun>> {
        self.current.lock().clone()
    }

    /// Run one prompt through the tool adapter for the session's agent,
    /// reporting everything to the daemon over the channel.
    pub async fn run_prompt(
        self: &Arc<Self>,
        params: ExecutePromptParams,
    ) -> Result<ExecutePromptResult, ExecutorError> {
        let adapter = adapter_for(params.agentic_tool);
        self.run_prompt_with(params, adapter.as_ref()).await
    }

    /// Same as [`run_prompt`](Self::run_prompt) with an explicit adapter
    /// (tests inject a scripted one).
    pub async fn run_prompt_with(
        self: &Arc<Self>,
        params: ExecutePromptParams,
        adapter: &dyn crate::adapters::ToolAdapter,
    ) -> Result<ExecutePromptResult, ExecutorError> {
        let run = Arc::new(CurrentRun {
            session_id: params.session_id,
            task_id: params.task_id,
            cancel: CancellationToken::new(),
            stop_handled: AtomicBool::new(false),
        });
        *self.current.lock() = Some(Arc::clone(&run));

        let result = self.run_prompt_inner(&params, &run, adapter).await;

        // The run is over either way; drop it and cancel leftover waiters
        *self.current.lock() = None;
        self.permissions.cancel_task(&params.task_id);
        result
    }

    async fn run_prompt_inner(
        self: &Arc<Self>,
        params: &ExecutePromptParams,
        run: &Arc<CurrentRun>,
        adapter: &dyn crate::adapters::ToolAdapter,
    ) -> Result<ExecutePromptResult, ExecutorError> {
        let api_key = self.fetch_api_key(params.agentic_tool).await?;

        let input = TaskInput {
            session_id: params.session_id,
            task_id: params.task_id,
            prompt: params.prompt.clone(),
            cwd: params.cwd.clone(),
            api_key,
            permission_mode: params.permission_mode.clone(),
            timeout: params.timeout_ms.map(Duration::from_millis),
        };
        let sink = DaemonSink { state: Arc::clone(self), run: Arc::clone(run) };
        info!(tool = adapter.name(), task_id = %params.task_id, "running adapter");

        match adapter.run(&input, &sink, &run.cancel).await {
            Ok(outcome) => {
                if let Some(ref content) = outcome.final_message {
                    self.daemon_command(
                        DaemonCommand::CreateMessage,
                        json!({
                            "task_id": params.task_id,
                            "session_id": params.session_id,
                            "role": "assistant",
                            "content": content,
                        }),
                    )
                    .await;
                }
                self.daemon_command(
                    DaemonCommand::UpdateTask,
                    json!({
                        "task_id": params.task_id,
                        "status": TaskStatus::Completed,
                        "completed_at": self.now_ms(),
                    }),
                )
                .await;
                Ok(ExecutePromptResult {
                    status: ExecuteStatus::Completed,
                    message_count: outcome.message_count,
                    token_usage: outcome.token_usage,
                    error: None,
                })
            }
            Err(AdapterError::Cancelled) => {
                // When the stop path already patched the task and emitted
                // task_stopped_complete there is nothing further to write.
                if !run.stop_handled.load(Ordering::Acquire) {
                    self.daemon_command(
                        DaemonCommand::UpdateTask,
                        json!({
                            "task_id": params.task_id,
                            "status": TaskStatus::Stopped,
                            "completed_at": self.now_ms(),
                        }),
                    )
                    .await;
                }
                Ok(ExecutePromptResult {
                    status: ExecuteStatus::Cancelled,
                    message_count: 0,
                    token_usage: None,
                    error: None,
                })
            }
            Err(e) => {
                let message = e.to_string();
                self.daemon_command(
                    DaemonCommand::UpdateTask,
                    json!({
                        "task_id": params.task_id,
                        "status": TaskStatus::Failed,
                        "completed_at": self.now_ms(),
                        "error": { "code": "command_failed", "message": message },
                    }),
                )
                .await;
                Ok(ExecutePromptResult {
                    status: ExecuteStatus::Failed,
                    message_count: 0,
                    token_usage: None,
                    error: Some(RpcErrorBody {
                        message,
                        code: "adapter_error".to_string(),
                        stack: None,
                    }),
                })
            }
        }
    }

    async fn fetch_api_key(&self, tool: AgenticTool) -> Result<Option<String>, ExecutorError> {
        let credential_key = tool.credential_key();
        let params = GetApiKeyParams {
            session_token: self.session_token.clone(),
            credential_key,
        };
        let value = self
            .peer()?
            .call(
                method::GET_API_KEY,
                serde_json::to_value(&params).unwrap_or(Value::Null),
            )
            .await
            .map_err(|e| ExecutorError::DaemonRefused {
                method: method::GET_API_KEY,
                detail: e.to_string(),
            })?;
        let result: GetApiKeyResult =
            serde_json::from_value(value).map_err(|e| ExecutorError::BadPayload {
                method: method::GET_API_KEY,
                detail: e.to_string(),
            })?;
        Ok(result.api_key)
    }

    /// `task_stop` handling: match both ids, ack immediately, abort, patch
    /// the task, then report completion.
    pub async fn handle_task_stop(&self, params: TaskStopParams) {
        let current = self.current_run();

        // A late stop for a previous task must not terminate a newly
        // started successor: both ids have to match the current run.
        let matches = current
            .as_ref()
            .is_some_and(|run| {
                run.session_id == params.session_id && run.task_id == params.task_id
            });

        let already_stopped = match current {
            Some(ref run) if matches => run.cancel.is_cancelled(),
            _ => true,
        };

        if !matches && current.is_some() {
            warn!(
                stop_task = %params.task_id,
                "task_stop does not match current run; acking as already stopped"
            );
        }

        let ack = TaskStopAckParams {
            session_id: params.session_id,
            task_id: params.task_id,
            sequence: params.sequence,
            received_at: self.now_ms(),
            status: if already_stopped {
                StopAckStatus::AlreadyStopped
            } else {
                StopAckStatus::Stopping
            },
        };
        self.notify(notification::TASK_STOP_ACK, serde_json::to_value(&ack).ok()).await;

        if already_stopped {
            return;
        }

        if let Some(run) = self.current_run() {
            if run.session_id == params.session_id && run.task_id == params.task_id {
                run.stop_handled.store(true, Ordering::Release);
                run.cancel.cancel();
                self.permissions.cancel_task(&params.task_id);

                self.daemon_command(
                    DaemonCommand::UpdateTask,
                    json!({
                        "task_id": params.task_id,
                        "status": TaskStatus::Stopped,
                        "completed_at": self.now_ms(),
                    }),
                )
                .await;

                let complete = TaskStoppedCompleteParams {
                    session_id: params.session_id,
                    task_id: params.task_id,
                    stopped_at: self.now_ms(),
                };
                self.notify(
                    notification::TASK_STOPPED_COMPLETE,
                    serde_json::to_value(&complete).ok(),
                )
                .await;
            }
        }
    }

    async fn daemon_command(&self, command: DaemonCommand, data: Value) {
        let params = DaemonCommandParams {
            session_token: self.session_token.clone(),
            command,
            data,
        };
        self.notify(notification::DAEMON_COMMAND, serde_json::to_value(&params).ok()).await;
    }

    async fn notify(&self, method_name: &str, params: Option<Value>) {
        let Ok(peer) = self.peer() else { return };
        if let Err(e) = peer.notify(method_name, params.unwrap_or(Value::Null)).await {
            warn!(method = method_name, error = %e, "notification failed");
        }
    }
}

/// Streaming sink that forwards everything to the daemon.
struct DaemonSink {
    state: Arc<ExecutorState>,
    run: Arc<CurrentRun>,
}

impl DaemonSink {
    fn base(&self) -> Value {
        json!({
            "session_id": self.run.session_id,
            "task_id": self.run.task_id,
        })
    }

    fn with_chunk(&self, chunk: &str) -> Value {
        json!({
            "session_id": self.run.session_id,
            "task_id": self.run.task_id,
            "chunk": chunk,
        })
    }
}

#[async_trait]
impl StreamSink for DaemonSink {
    async fn on_stream_start(&self) {
        self.state.daemon_command(DaemonCommand::StreamStart, self.base()).await;
    }

    async fn on_stream_chunk(&self, chunk: &str) {
        self.state.daemon_command(DaemonCommand::StreamChunk, self.with_chunk(chunk)).await;
    }

    async fn on_stream_end(&self) {
        let mut data = self.base();
        if let Some(obj) = data.as_object_mut() {
            obj.insert("end".into(), Value::Bool(true));
        }
        self.state.daemon_command(DaemonCommand::StreamChunk, data).await;
    }

    async fn on_stream_error(&self, error: &str) {
        let mut data = self.base();
        if let Some(obj) = data.as_object_mut() {
            obj.insert("error".into(), Value::String(error.to_string()));
        }
        self.state.daemon_command(DaemonCommand::StreamChunk, data).await;
    }

    async fn on_thinking_start(&self) {
        self.state.daemon_command(DaemonCommand::ThinkingStart, self.base()).await;
    }

    async fn on_thinking_chunk(&self, chunk: &str) {
        self.state.daemon_command(DaemonCommand::ThinkingChunk, self.with_chunk(chunk)).await;
    }

    async fn on_thinking_end(&self) {
        self.state.daemon_command(DaemonCommand::ThinkingEnd, self.base()).await;
    }

    async fn request_permission(&self, tool_name: &str, tool_input: Value) -> bool {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.state
            .daemon_command(
                DaemonCommand::EmitPermissionEvent,
                json!({
                    "request_id": request_id,
                    "session_id": self.run.session_id,
                    "task_id": self.run.task_id,
                    "tool_name": tool_name,
                    "tool_input": tool_input,
                    "timestamp": self.state.now_ms(),
                }),
            )
            .await;

        let decision = self
            .state
            .permissions
            .wait_for_decision(
                &request_id,
                self.run.session_id,
                self.run.task_id,
                self.state.permission_timeout,
            )
            .await;
        if !decision.allow {
            info!(
                tool_name,
                reason = decision.reason.as_deref().unwrap_or(""),
                "permission denied"
            );
        }
        decision.allow
    }
}

/// RPC dispatch for everything the daemon sends us.
pub struct ExecutorHandler {
    pub state: Arc<ExecutorState>,
}

#[async_trait]
impl RpcHandler for ExecutorHandler {
    async fn handle_request(&self, method_name: &str, params: Value) -> Result<Value, RpcError> {
        match method_name {
            method::PING => {
                let result = PingResult { pong: true, timestamp: self.state.now_ms() };
                serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
            }

            method::EXECUTE_PROMPT => {
                let params: ExecutePromptParams = serde_json::from_value(params)
                    .map_err(|e| RpcError::handler(format!("bad execute_prompt: {e}"), None))?;
                let result = self
                    .state
                    .run_prompt(params)
                    .await
                    .map_err(|e| RpcError::handler(e.to_string(), None))?;
                serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
            }

            method::SHUTDOWN => {
                self.state.shutdown.notify_one();
                Ok(json!({}))
            }

            other => Err(RpcError::unknown_method(other)),
        }
    }

    async fn handle_notification(&self, method_name: &str, params: Value) {
        match method_name {
            notification::TASK_STOP => {
                match serde_json::from_value::<TaskStopParams>(params) {
                    Ok(stop) => self.state.handle_task_stop(stop).await,
                    Err(e) => warn!(error = %e, "malformed task_stop"),
                }
            }
            notification::PERMISSION_RESOLVED => {
                match serde_json::from_value::<PermissionResolvedParams>(params) {
                    Ok(resolved) => {
                        self.state.permissions.resolve(
                            &resolved.request_id,
                            resolved.allow,
                            resolved.reason,
                        );
                    }
                    Err(e) => warn!(error = %e, "malformed permission_resolved"),
                }
            }
            other => warn!(method = other, "unexpected notification"),
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;

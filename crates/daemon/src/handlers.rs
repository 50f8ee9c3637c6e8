// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC dispatch for executor connections.
//!
//! Every inbound call authenticates with the service token minted at
//! spawn; claims decide the acting user and session. `daemon_command`
//! works in both request form (queries return data) and notification form
//! (mutations).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use agor_auth::TokenSigner;
use agor_core::{
    ChannelEvent, Clock, MessageId, Role, SessionId, SystemClock, TaskId, TaskStatus,
    TokenClaims,
};
use agor_storage::SessionPatch;
use agor_wire::{
    method, notification, DaemonCommand, DaemonCommandParams, GetApiKeyParams, GetApiKeyResult,
    PingResult, ReportMessageParams, RequestPermissionParams, RequestPermissionResult, RpcError,
    RpcHandler, RpcPeer, TaskStopAckParams, TaskStoppedCompleteParams,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::fanout::ChannelHub;
use crate::permissions::{PermissionEvent, PermissionRouter};
use crate::SharedState;

/// Shared daemon context for all executor connections.
pub struct DaemonCtx {
    pub state: SharedState,
    pub hub: Arc<ChannelHub>,
    pub signer: TokenSigner,
    pub permissions: PermissionRouter,
    clock: SystemClock,
    /// Active streaming message per task (assigned at stream_start).
    stream_ids: Mutex<HashMap<TaskId, MessageId>>,
}

impl DaemonCtx {
    pub fn new(state: SharedState, hub: Arc<ChannelHub>, signer: TokenSigner) -> Arc<Self> {
        Arc::new(Self {
            state,
            hub,
            signer,
            permissions: PermissionRouter::default(),
            clock: SystemClock,
            stream_ids: Mutex::new(HashMap::new()),
        })
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, RpcError> {
        self.signer
            .verify(token, self.now_ms())
            .map_err(|e| RpcError::handler(e.to_string(), None))
    }
}

/// Handler for one executor connection.
pub struct DaemonRpcHandler {
    pub ctx: Arc<DaemonCtx>,
    /// The peer for this connection, installed right after spawn so
    /// permission resolutions can be pushed back.
    executor: OnceLock<RpcPeer>,
}

impl DaemonRpcHandler {
    pub fn new(ctx: Arc<DaemonCtx>) -> Arc<Self> {
        Arc::new(Self { ctx, executor: OnceLock::new() })
    }

    pub fn set_peer(&self, peer: RpcPeer) {
        let _ = self.executor.set(peer);
    }

    fn executor_peer(&self) -> Option<&RpcPeer> {
        self.executor.get()
    }

    async fn get_api_key(&self, params: Value) -> Result<Value, RpcError> {
        let params: GetApiKeyParams = serde_json::from_value(params)
            .map_err(|e| RpcError::handler(format!("bad get_api_key: {e}"), None))?;
        let claims = self.ctx.verify(&params.session_token)?;

        let stored = self
            .ctx
            .state
            .lock()
            .credential(&claims.user_id, params.credential_key)
            .map(str::to_string);
        // Environment fallback is permitted when the user has no stored
        // secret
        let api_key = stored.or_else(|| params.credential_key.env_fallback());
        debug!(
            user_id = %claims.user_id,
            key = %params.credential_key,
            found = api_key.is_some(),
            "credential request"
        );
        serde_json::to_value(GetApiKeyResult { api_key })
            .map_err(|e| RpcError::internal(e.to_string()))
    }

    async fn request_permission(&self, params: Value) -> Result<Value, RpcError> {
        let params: RequestPermissionParams = serde_json::from_value(params)
            .map_err(|e| RpcError::handler(format!("bad request_permission: {e}"), None))?;
        let claims = self.ctx.verify(&params.session_token)?;

        let event = PermissionEvent {
            request_id: uuid_like(),
            session_id: claims.session_id,
            task_id: params.task_id,
            tool_name: params.tool_name.clone(),
            tool_input: params.tool_params.clone(),
            timestamp: self.ctx.now_ms(),
        };
        // Synchronous path: the stub policy answers immediately; the
        // request/resolved pair still reaches subscribers.
        self.ctx
            .permissions
            .handle_event(&self.ctx.state, &self.ctx.hub, self.executor_peer(), event)
            .await;

        serde_json::to_value(RequestPermissionResult { approved: true, reason: None })
            .map_err(|e| RpcError::internal(e.to_string()))
    }

    fn apply_daemon_command(
        &self,
        claims: &TokenClaims,
        command: DaemonCommand,
        data: &Value,
    ) -> Result<Value, RpcError> {
        let now = self.ctx.now_ms();
        match command {
            DaemonCommand::CreateMessage => {
                let task_id = required_id(data, "task_id")?;
                let role: Role = serde_json::from_value(
                    data.get("role").cloned().unwrap_or(Value::Null),
                )
                .map_err(|e| RpcError::handler(format!("bad role: {e}"), None))?;
                let content = data.get("content").and_then(Value::as_str).unwrap_or("");

                let mut state = self.ctx.state.lock();
                let message = state
                    .append_message(&TaskId::from_string(&task_id), role, content, now)
                    .map_err(|e| RpcError::handler(e.to_string(), None))?;
                serde_json::to_value(message).map_err(|e| RpcError::internal(e.to_string()))
            }

            DaemonCommand::UpdateTask => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                let status: TaskStatus = serde_json::from_value(
                    data.get("status").cloned().unwrap_or(Value::Null),
                )
                .map_err(|e| RpcError::handler(format!("bad status: {e}"), None))?;

                let mut state = self.ctx.state.lock();
                if let Some(error) = data.get("error") {
                    if !error.is_null() {
                        if let Ok(body) = serde_json::from_value(error.clone()) {
                            let _ = state.set_task_error(&task_id, body);
                        }
                    }
                }
                state
                    .update_task_status(&task_id, status, now)
                    .map_err(|e| RpcError::handler(e.to_string(), None))?;
                Ok(json!({}))
            }

            DaemonCommand::UpdateSession => {
                let session_id = SessionId::from_string(required_id(data, "session_id")?);
                let status = match data.get("status") {
                    Some(value) if !value.is_null() => Some(
                        serde_json::from_value(value.clone())
                            .map_err(|e| RpcError::handler(format!("bad status: {e}"), None))?,
                    ),
                    _ => None,
                };
                // Executors never own ready_for_prompt: that flag belongs
                // to the stop protocol and the queue runner.
                if data.get("ready_for_prompt").is_some() {
                    warn!(session_id = %session_id, "executor tried to set ready_for_prompt; ignored");
                }
                let patch = SessionPatch { status, ready_for_prompt: None, archived: None };
                self.ctx
                    .state
                    .lock()
                    .patch_session(&session_id, patch)
                    .map_err(|e| RpcError::handler(e.to_string(), None))?;
                Ok(json!({}))
            }

            DaemonCommand::GetSession => {
                let session_id = SessionId::from_string(required_id(data, "session_id")?);
                let state = self.ctx.state.lock();
                let session = state
                    .session(&session_id)
                    .map_err(|e| RpcError::handler(e.to_string(), None))?;
                serde_json::to_value(session).map_err(|e| RpcError::internal(e.to_string()))
            }

            DaemonCommand::GetMessages => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                let state = self.ctx.state.lock();
                serde_json::to_value(state.messages_for_task(&task_id))
                    .map_err(|e| RpcError::internal(e.to_string()))
            }

            DaemonCommand::StreamStart => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                let message_id = MessageId::new();
                self.ctx.stream_ids.lock().insert(task_id, message_id);
                self.ctx.hub.publish(ChannelEvent::StreamingStart {
                    message_id,
                    session_id: claims.session_id,
                    task_id: Some(task_id),
                    role: Role::Assistant,
                });
                Ok(json!({}))
            }

            DaemonCommand::StreamChunk => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                let message_id = self
                    .ctx
                    .stream_ids
                    .lock()
                    .get(&task_id)
                    .copied()
                    .unwrap_or_else(MessageId::new);

                let event = if let Some(error) = data.get("error").and_then(Value::as_str) {
                    self.ctx.stream_ids.lock().remove(&task_id);
                    ChannelEvent::StreamingError {
                        message_id,
                        session_id: claims.session_id,
                        task_id: Some(task_id),
                        role: Role::Assistant,
                        error: error.to_string(),
                    }
                } else if data.get("end").and_then(Value::as_bool) == Some(true) {
                    self.ctx.stream_ids.lock().remove(&task_id);
                    ChannelEvent::StreamingEnd {
                        message_id,
                        session_id: claims.session_id,
                        task_id: Some(task_id),
                        role: Role::Assistant,
                    }
                } else {
                    ChannelEvent::StreamingChunk {
                        message_id,
                        session_id: claims.session_id,
                        task_id: Some(task_id),
                        role: Role::Assistant,
                        chunk: data
                            .get("chunk")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string(),
                    }
                };
                self.ctx.hub.publish(event);
                Ok(json!({}))
            }

            DaemonCommand::ThinkingStart => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                self.ctx.hub.publish(ChannelEvent::ThinkingStart {
                    session_id: claims.session_id,
                    task_id,
                });
                Ok(json!({}))
            }

            DaemonCommand::ThinkingChunk => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                self.ctx.hub.publish(ChannelEvent::ThinkingChunk {
                    session_id: claims.session_id,
                    task_id,
                    chunk: data.get("chunk").and_then(Value::as_str).unwrap_or("").to_string(),
                });
                Ok(json!({}))
            }

            DaemonCommand::ThinkingEnd => {
                let task_id = TaskId::from_string(required_id(data, "task_id")?);
                self.ctx.hub.publish(ChannelEvent::ThinkingEnd {
                    session_id: claims.session_id,
                    task_id,
                });
                Ok(json!({}))
            }

            // Handled async in the notification path
            DaemonCommand::EmitPermissionEvent => Ok(json!({})),
        }
    }
}

fn required_id(data: &Value, field: &'static str) -> Result<String, RpcError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RpcError::handler(format!("missing {field}"), None))
}

fn uuid_like() -> String {
    format!("req-{}", nanoid::nanoid!(19))
}

#[async_trait]
impl RpcHandler for DaemonRpcHandler {
    async fn handle_request(&self, method_name: &str, params: Value) -> Result<Value, RpcError> {
        match method_name {
            method::PING => {
                serde_json::to_value(PingResult { pong: true, timestamp: self.ctx.now_ms() })
                    .map_err(|e| RpcError::internal(e.to_string()))
            }

            method::GET_API_KEY => self.get_api_key(params).await,

            method::REQUEST_PERMISSION => self.request_permission(params).await,

            notification::DAEMON_COMMAND => {
                let params: DaemonCommandParams = serde_json::from_value(params)
                    .map_err(|e| RpcError::handler(format!("bad daemon_command: {e}"), None))?;
                let claims = self.ctx.verify(&params.session_token)?;
                self.apply_daemon_command(&claims, params.command, &params.data)
            }

            other => Err(RpcError::unknown_method(other)),
        }
    }

    async fn handle_notification(&self, method_name: &str, params: Value) {
        match method_name {
            notification::REPORT_MESSAGE => {
                match serde_json::from_value::<ReportMessageParams>(params) {
                    Ok(report) => {
                        if self.ctx.verify(&report.session_token).is_ok() {
                            debug!(
                                task_id = %report.task_id,
                                sequence = report.sequence,
                                event_type = report.event_type,
                                "executor report"
                            );
                        }
                    }
                    Err(e) => warn!(error = %e, "malformed report_message"),
                }
            }

            notification::DAEMON_COMMAND => {
                let parsed: Result<DaemonCommandParams, _> = serde_json::from_value(params);
                let Ok(command) = parsed else {
                    warn!("malformed daemon_command notification");
                    return;
                };
                let Ok(claims) = self.ctx.verify(&command.session_token) else {
                    warn!("daemon_command with invalid token");
                    return;
                };

                if command.command == DaemonCommand::EmitPermissionEvent {
                    match PermissionEvent::from_value(&command.data) {
                        Some(event) => {
                            self.ctx
                                .permissions
                                .handle_event(
                                    &self.ctx.state,
                                    &self.ctx.hub,
                                    self.executor_peer(),
                                    event,
                                )
                                .await;
                        }
                        None => warn!("malformed emit_permission_event"),
                    }
                    return;
                }

                if let Err(e) = self.apply_daemon_command(&claims, command.command, &command.data)
                {
                    warn!(command = %command.command, error = %e, "daemon_command failed");
                }
            }

            notification::TASK_STOP_ACK => {
                match serde_json::from_value::<TaskStopAckParams>(params) {
                    Ok(ack) => self.ctx.hub.publish(ChannelEvent::TaskStopAck {
                        session_id: ack.session_id,
                        task_id: ack.task_id,
                        sequence: ack.sequence,
                        received_at: ack.received_at,
                        status: ack.status,
                    }),
                    Err(e) => warn!(error = %e, "malformed task_stop_ack"),
                }
            }

            notification::TASK_STOPPED_COMPLETE => {
                match serde_json::from_value::<TaskStoppedCompleteParams>(params) {
                    Ok(complete) => self.ctx.hub.publish(ChannelEvent::TaskStoppedComplete {
                        session_id: complete.session_id,
                        task_id: complete.task_id,
                        stopped_at: complete.stopped_at,
                    }),
                    Err(e) => warn!(error = %e, "malformed task_stopped_complete"),
                }
            }

            other => warn!(method = other, "unexpected notification"),
        }
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission broker, daemon side.
//!
//! Requests from executors are fanned out to the session channel and the
//! owning task is flagged `awaiting_permission`. Decisions travel back to
//! the executor as `permission_resolved` notifications. The policy engine
//! is a stub that auto-approves; the wait/timeout/cancel semantics live in
//! the executor's manager either way, so a silent daemon still converges.

use std::sync::Arc;

use agor_core::{ChannelEvent, PermissionScope, SessionId, TaskId};
use agor_wire::{notification, PermissionResolvedParams, RpcPeer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::fanout::ChannelHub;
use crate::SharedState;

/// A parsed `emit_permission_event` payload.
#[derive(Debug, Clone)]
pub struct PermissionEvent {
    pub request_id: String,
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub tool_name: String,
    pub tool_input: Value,
    pub timestamp: u64,
}

impl PermissionEvent {
    pub fn from_value(data: &Value) -> Option<Self> {
        Some(Self {
            request_id: data.get("request_id")?.as_str()?.to_string(),
            session_id: SessionId::from_string(data.get("session_id")?.as_str()?),
            task_id: TaskId::from_string(data.get("task_id")?.as_str()?),
            tool_name: data.get("tool_name")?.as_str()?.to_string(),
            tool_input: data.get("tool_input").cloned().unwrap_or(Value::Null),
            timestamp: data.get("timestamp").and_then(Value::as_u64).unwrap_or(0),
        })
    }
}

/// Routes permission traffic between executors, subscribers, and the
/// (stub) policy.
pub struct PermissionRouter {
    auto_approve: bool,
}

impl Default for PermissionRouter {
    fn default() -> Self {
        Self { auto_approve: true }
    }
}

impl PermissionRouter {
    pub fn new(auto_approve: bool) -> Self {
        Self { auto_approve }
    }

    /// Handle an inbound permission request from an executor.
    pub async fn handle_event(
        &self,
        state: &SharedState,
        hub: &Arc<ChannelHub>,
        executor: Option<&RpcPeer>,
        event: PermissionEvent,
    ) {
        if let Err(e) = state.lock().set_awaiting_permission(&event.task_id, true) {
            warn!(task_id = %event.task_id, error = %e, "awaiting_permission flag failed");
        }

        hub.publish(ChannelEvent::PermissionRequest {
            session_id: event.session_id,
            request_id: event.request_id.clone(),
            task_id: event.task_id,
            tool_name: event.tool_name.clone(),
            tool_input: event.tool_input.clone(),
            timestamp: event.timestamp,
        });

        if self.auto_approve {
            debug!(request_id = event.request_id, tool = event.tool_name, "policy auto-approve");
            self.resolve(
                state,
                hub,
                executor,
                Resolution {
                    request_id: event.request_id,
                    session_id: event.session_id,
                    task_id: event.task_id,
                    allow: true,
                    reason: None,
                    remember: false,
                    scope: PermissionScope::Once,
                    decided_by: "policy:auto".to_string(),
                },
            )
            .await;
        }
    }

    /// Apply a decision (human or policy): clear the task flag, fan out,
    /// and notify the executor.
    pub async fn resolve(
        &self,
        state: &SharedState,
        hub: &Arc<ChannelHub>,
        executor: Option<&RpcPeer>,
        resolution: Resolution,
    ) {
        if let Err(e) = state.lock().set_awaiting_permission(&resolution.task_id, false) {
            debug!(task_id = %resolution.task_id, error = %e, "clearing awaiting_permission failed");
        }

        hub.publish(ChannelEvent::PermissionResolved {
            session_id: resolution.session_id,
            request_id: resolution.request_id.clone(),
            task_id: resolution.task_id,
            allow: resolution.allow,
            reason: resolution.reason.clone(),
            remember: resolution.remember,
            scope: resolution.scope,
            decided_by: resolution.decided_by.clone(),
        });

        if let Some(peer) = executor {
            let params = PermissionResolvedParams {
                request_id: resolution.request_id,
                task_id: resolution.task_id,
                allow: resolution.allow,
                reason: resolution.reason,
                remember: resolution.remember,
                scope: resolution.scope,
                decided_by: resolution.decided_by,
            };
            if let Err(e) = peer
                .notify(
                    notification::PERMISSION_RESOLVED,
                    serde_json::to_value(&params).unwrap_or(Value::Null),
                )
                .await
            {
                warn!(error = %e, "permission_resolved notify failed");
            }
        }
    }
}

/// A decision to apply.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub request_id: String,
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub allow: bool,
    pub reason: Option<String>,
    pub remember: bool,
    pub scope: PermissionScope,
    pub decided_by: String,
}

#[cfg(test)]
#[path = "permissions_tests.rs"]
mod tests;

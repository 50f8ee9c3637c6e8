// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The acknowledged stop protocol.
//!
//! Three phases: send-and-ACK (3 attempts, ACK matched on `(task_id,
//! sequence)`), await `task_stopped_complete` (matched on both ids), then
//! finalize the session. Both safety-net branches re-check the session
//! status and refuse to clobber a session that already moved on to a
//! newer task. After any user-initiated stop, `ready_for_prompt` is
//! false: queued prompts wait for an explicit human prompt.

use std::sync::Arc;
use std::time::Instant;

use agor_core::{
    ChannelEvent, Clock, LimitsConfig, SessionId, SessionStatus, SystemClock, TaskId,
    TaskStatus,
};
use agor_storage::SessionPatch;
use agor_wire::{notification, RpcPeer, TaskStopParams};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::fanout::ChannelHub;
use crate::SharedState;

const STOP_ATTEMPTS: u32 = 3;

/// What a stop attempt reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    pub success: bool,
    pub reason: String,
}

impl StopOutcome {
    fn ok(reason: impl Into<String>) -> Self {
        Self { success: true, reason: reason.into() }
    }
}

/// Drives session/task terminal transitions for user-initiated stops.
pub struct StopProtocol {
    state: SharedState,
    hub: Arc<ChannelHub>,
    limits: LimitsConfig,
    clock: SystemClock,
}

impl StopProtocol {
    pub fn new(state: SharedState, hub: Arc<ChannelHub>, limits: LimitsConfig) -> Self {
        Self { state, hub, limits, clock: SystemClock }
    }

    /// User-initiated stop: move the running pair to STOPPING, then run
    /// the acknowledged protocol.
    pub async fn initiate(
        &self,
        session_id: SessionId,
        task_id: TaskId,
        executor: Option<&RpcPeer>,
    ) -> StopOutcome {
        {
            let mut state = self.state.lock();
            if let Err(e) = state.update_task_status(&task_id, TaskStatus::Stopping, self.clock.epoch_ms())
            {
                info!(task_id = %task_id, error = %e, "stop: task not stoppable");
            }
            if let Err(e) =
                state.patch_session(&session_id, SessionPatch::status(SessionStatus::Stopping))
            {
                info!(session_id = %session_id, error = %e, "stop: session not stoppable");
            }
        }
        self.stop_task(session_id, task_id, executor).await
    }

    /// Run the protocol against a task already in STOPPING.
    pub async fn stop_task(
        &self,
        session_id: SessionId,
        task_id: TaskId,
        executor: Option<&RpcPeer>,
    ) -> StopOutcome {
        // Pre-check: no-op when the task already left STOPPING
        let status = {
            let state = self.state.lock();
            match state.task(&task_id) {
                Ok(task) => task.status,
                Err(_) => return StopOutcome::ok(format!("Task not found: {task_id}")),
            }
        };
        if status != TaskStatus::Stopping {
            return StopOutcome::ok(format!("Task already {status}"));
        }

        let mut rx = self.hub.subscribe_internal(session_id);

        // Phase 1 — send & ACK
        let mut acked = false;
        let mut sequence: u64 = 0;
        for attempt in 1..=STOP_ATTEMPTS {
            sequence += 1;
            let stop = TaskStopParams {
                session_id,
                task_id,
                sequence,
                timestamp: self.clock.epoch_ms(),
            };
            self.hub.publish(ChannelEvent::TaskStop {
                session_id,
                task_id,
                sequence,
                timestamp: stop.timestamp,
            });
            if let Some(peer) = executor {
                if let Err(e) = peer
                    .notify(
                        notification::TASK_STOP,
                        serde_json::to_value(&stop).unwrap_or(serde_json::Value::Null),
                    )
                    .await
                {
                    warn!(attempt, error = %e, "task_stop notify failed");
                }
            }

            if self.await_ack(&mut rx, task_id, sequence).await {
                acked = true;
                break;
            }
            info!(attempt, task_id = %task_id, "no stop ACK, retrying");
        }

        if !acked {
            return self.force_stop(session_id, task_id, "executor did not acknowledge");
        }

        // Phase 2 — await completion
        if !self.await_complete(&mut rx, session_id, task_id).await {
            return self.force_stop(session_id, task_id, "executor did not complete stop");
        }

        // Phase 3 — finalize
        self.finalize(session_id, task_id);
        StopOutcome::ok("stopped")
    }

    /// Wait for a `task_stop_ack` matching `(task_id, sequence)` within
    /// the ACK window. Retries are distinguished purely by sequence.
    async fn await_ack(
        &self,
        rx: &mut broadcast::Receiver<ChannelEvent>,
        task_id: TaskId,
        sequence: u64,
    ) -> bool {
        let deadline = Instant::now() + self.limits.stop_ack_timeout();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Ok(ChannelEvent::TaskStopAck { task_id: t, sequence: s, .. }))
                    if t == task_id && s == sequence =>
                {
                    return true;
                }
                Ok(Ok(_)) => continue,
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => return false,
                Err(_) => return false,
            }
        }
    }

    /// Wait for `task_stopped_complete` matching both ids.
    async fn await_complete(
        &self,
        rx: &mut broadcast::Receiver<ChannelEvent>,
        session_id: SessionId,
        task_id: TaskId,
    ) -> bool {
        let deadline = Instant::now() + self.limits.stop_complete_timeout();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Ok(ChannelEvent::TaskStoppedComplete {
                    session_id: sid,
                    task_id: tid,
                    ..
                })) if sid == session_id && tid == task_id => return true,
                Ok(Ok(_)) => continue,
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => return false,
                Err(_) => return false,
            }
        }
    }

    /// Safety net: make progress out of STOPPING at any cost. Errors here
    /// are logged and swallowed.
    fn force_stop(
        &self,
        session_id: SessionId,
        task_id: TaskId,
        reason: &str,
    ) -> StopOutcome {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();

        // The old task is patched to STOPPED either way
        if let Err(e) = state.update_task_status(&task_id, TaskStatus::Stopped, now) {
            info!(task_id = %task_id, error = %e, "force-stop: task patch skipped");
        }

        // Re-read the session: if it left STOPPING (a new task began),
        // leave it alone.
        let session_status = state.session(&session_id).map(|s| s.status);
        match session_status {
            Ok(SessionStatus::Stopping) => {
                if let Err(e) = state.patch_session(
                    &session_id,
                    SessionPatch::status(SessionStatus::Idle).with_ready_for_prompt(false),
                ) {
                    warn!(session_id = %session_id, error = %e, "force-stop: session patch failed");
                }
                warn!(session_id = %session_id, task_id = %task_id, reason, "force-stopped");
                StopOutcome::ok(reason)
            }
            _ => StopOutcome::ok("Task force-stopped but session already moved on to new task"),
        }
    }

    /// Phase 3: the session returns to IDLE with `ready_for_prompt`
    /// cleared. The executor already patched the task via the channel; a
    /// non-terminal task here is patched as a fallback.
    fn finalize(&self, session_id: SessionId, task_id: TaskId) {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        if let Ok(task) = state.task(&task_id) {
            if !task.status.is_terminal() {
                let _ = state.update_task_status(&task_id, TaskStatus::Stopped, now);
            }
        }
        if let Err(e) = state.patch_session(
            &session_id,
            SessionPatch::status(SessionStatus::Idle).with_ready_for_prompt(false),
        ) {
            warn!(session_id = %session_id, error = %e, "stop finalize: session patch failed");
        }
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt runner: one user prompt, one task, one executor run.
//!
//! Drives the authoritative transitions: the task is created RUNNING-bound
//! and the session moves IDLE → RUNNING before the executor spawns; after
//! the run the session returns to IDLE. A session that moved to STOPPING
//! mid-run belongs to the stop protocol and is left alone here.

use std::path::PathBuf;
use std::sync::Arc;

use agor_auth::{AuthError, TokenSigner};
use agor_core::{
    AgorConfig, Clock, ErrorBody, ErrorKind, Role, SessionId, SessionStatus, SystemClock,
    TaskId, TaskStatus, TokenRole, UserId,
};
use agor_storage::{SessionPatch, StorageError};
use agor_wire::{ExecutePromptParams, ExecutePromptResult, ExecuteStatus};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::pool::PoolError;
use crate::SharedState;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Transport(#[from] agor_wire::ProtocolError),

    #[error("session {0} is not ready for a prompt")]
    NotReady(SessionId),
}

/// Executes one prompt end-to-end. The production backend spawns a pooled
/// executor child; tests substitute an in-process fake.
#[async_trait]
pub trait ExecutorBackend: Send + Sync {
    async fn execute(
        &self,
        params: ExecutePromptParams,
    ) -> Result<ExecutePromptResult, RunnerError>;
}

/// Orchestrates prompt → task → executor → terminal state.
pub struct PromptRunner {
    state: SharedState,
    signer: TokenSigner,
    backend: Arc<dyn ExecutorBackend>,
    service_token_ttl_ms: u64,
    clock: SystemClock,
}

impl PromptRunner {
    pub fn new(
        state: SharedState,
        signer: TokenSigner,
        backend: Arc<dyn ExecutorBackend>,
        config: &AgorConfig,
    ) -> Self {
        Self {
            state,
            signer,
            backend,
            service_token_ttl_ms: config.auth.service_token_ttl_ms,
            clock: SystemClock,
        }
    }

    /// Run one prompt for an authorized user. Returns the finished task id.
    pub async fn run_prompt(
        &self,
        user_id: UserId,
        session_id: SessionId,
        prompt: &str,
    ) -> Result<TaskId, RunnerError> {
        let now = self.clock.epoch_ms();

        // Authorization: prompt rank plus the unix-username re-check
        let (task_id, params) = {
            let mut state = self.state.lock();
            agor_auth::authorize_create_task(&state, user_id, session_id)?;

            let session = state.session(&session_id)?.clone();
            let cwd = state.worktree(&session.worktree_id)?.path.clone();

            let task_id = state.create_task(session_id, prompt, now)?.id;
            state.update_task_status(&task_id, TaskStatus::Running, now)?;
            state.patch_session(&session_id, SessionPatch::status(SessionStatus::Running))?;

            let token = self
                .signer
                .issue(session_id, user_id, TokenRole::Service, now, self.service_token_ttl_ms)
                .map_err(RunnerError::Auth)?;

            let params = ExecutePromptParams {
                session_token: token,
                session_id,
                task_id,
                agentic_tool: session.agentic_tool,
                prompt: prompt.to_string(),
                cwd,
                tools: Vec::new(),
                permission_mode: None,
                timeout_ms: None,
                stream: true,
            };
            (task_id, params)
        };

        info!(session_id = %session_id, task_id = %task_id, "starting prompt run");
        let outcome = self.backend.execute(params).await;
        self.finalize(session_id, task_id, outcome);
        Ok(task_id)
    }

    /// Start a queued prompt only when the session is idle and
    /// `ready_for_prompt` — after a user-initiated stop the flag is false
    /// and queued prompts wait for an explicit human prompt.
    pub async fn run_queued_prompt(
        &self,
        user_id: UserId,
        session_id: SessionId,
        prompt: &str,
    ) -> Result<TaskId, RunnerError> {
        {
            let state = self.state.lock();
            let session = state.session(&session_id)?;
            if session.status != SessionStatus::Idle || !session.ready_for_prompt {
                return Err(RunnerError::NotReady(session_id));
            }
        }
        self.run_prompt(user_id, session_id, prompt).await
    }

    fn finalize(
        &self,
        session_id: SessionId,
        task_id: TaskId,
        outcome: Result<ExecutePromptResult, RunnerError>,
    ) {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();

        match outcome {
            Ok(result) => match result.status {
                ExecuteStatus::Completed => {
                    // The executor normally patched the task already
                    if state.task(&task_id).map(|t| !t.status.is_terminal()).unwrap_or(false) {
                        let _ = state.update_task_status(&task_id, TaskStatus::Completed, now);
                    }
                    if state.session(&session_id).map(|s| s.status).ok()
                        == Some(SessionStatus::Running)
                    {
                        // Normal completion re-arms the queue runner
                        let _ = state.patch_session(
                            &session_id,
                            SessionPatch::status(SessionStatus::Idle)
                                .with_ready_for_prompt(true),
                        );
                    }
                }
                ExecuteStatus::Cancelled => {
                    // The stop protocol owns session finalization and the
                    // ready_for_prompt flag on this path.
                    info!(task_id = %task_id, "run cancelled; stop protocol finalizes");
                }
                ExecuteStatus::Failed => {
                    let message = result
                        .error
                        .as_ref()
                        .map(|e| e.message.clone())
                        .unwrap_or_else(|| "tool run failed".to_string());
                    self.fail_task(&mut state, session_id, task_id, message, now);
                }
            },
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "executor run failed");
                self.fail_task(&mut state, session_id, task_id, e.to_string(), now);
            }
        }
    }

    /// Failure path: structured error, a final system message, task →
    /// FAILED, session → IDLE. Not fatal at the subsystem level.
    fn fail_task(
        &self,
        state: &mut agor_storage::MaterializedState,
        session_id: SessionId,
        task_id: TaskId,
        message: String,
        now: u64,
    ) {
        let body = ErrorBody::new(ErrorKind::CommandFailed, message);

        let terminal = state.task(&task_id).map(|t| t.status.is_terminal()).unwrap_or(true);
        if !terminal {
            let _ = state.set_task_error(&task_id, body.clone());
            // The UI-visible failure record precedes the terminal flip
            let content = serde_json::to_string(&body).unwrap_or_else(|_| body.to_string());
            let _ = state.append_message(&task_id, Role::System, content, now);
            let _ = state.update_task_status(&task_id, TaskStatus::Failed, now);
        }

        if state.session(&session_id).map(|s| s.status).ok() == Some(SessionStatus::Running) {
            let _ = state.patch_session(
                &session_id,
                SessionPatch::status(SessionStatus::Idle),
            );
        }
    }
}

/// Production backend: spawn a pooled executor child in IPC mode and
/// drive it with a single `execute_prompt` request.
pub struct PoolBackend {
    pub pool: Arc<crate::pool::ExecutorPool>,
    pub ctx: Arc<crate::handlers::DaemonCtx>,
    pub home_base: PathBuf,
}

/// Ceiling for one tool run when the caller sets no explicit timeout.
const DEFAULT_RUN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60 * 60);
const TERMINATE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

#[async_trait]
impl ExecutorBackend for PoolBackend {
    async fn execute(
        &self,
        params: ExecutePromptParams,
    ) -> Result<ExecutePromptResult, RunnerError> {
        let (user_id, unix_username) = {
            let state = self.ctx.state.lock();
            let session = state.session(&params.session_id)?;
            (session.created_by, session.unix_username.clone())
        };

        let mut env = Vec::new();
        if let Some(ref user) = unix_username {
            // Login shells strip the environment and HOME must point at
            // the impersonated user's home
            env.push((
                "HOME".to_string(),
                self.home_base.join(user).display().to_string(),
            ));
        }

        let spec = crate::pool::SpawnSpec {
            user_id,
            unix_username: unix_username.clone(),
            // Worktree group membership may be newer than the daemon's
            // login session; the login-shell form re-reads /etc/group.
            fresh_groups: unix_username.is_some(),
            env,
            args: Vec::new(),
        };

        let handler = crate::handlers::DaemonRpcHandler::new(Arc::clone(&self.ctx));
        let (executor_id, instance) =
            self.pool.spawn_ipc(spec, Arc::clone(&handler)).await?;
        handler.set_peer(instance.client.clone());

        let run_timeout = params
            .timeout_ms
            .map(std::time::Duration::from_millis)
            .unwrap_or(DEFAULT_RUN_TIMEOUT);
        let result = instance
            .client
            .call_with_timeout(
                agor_wire::method::EXECUTE_PROMPT,
                serde_json::to_value(&params).unwrap_or(serde_json::Value::Null),
                run_timeout,
            )
            .await;

        let _ = self.pool.terminate(&executor_id, TERMINATE_TIMEOUT).await;

        let value = result?;
        serde_json::from_value(value).map_err(|e| {
            RunnerError::Transport(agor_wire::ProtocolError::Malformed {
                line: "execute_prompt result".to_string(),
                detail: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

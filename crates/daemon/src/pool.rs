// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor pool: spawn, track, and terminate executor children.
//!
//! The impersonation mode is probed once at startup (`sudo -n -l`); per
//! task the pool builds the spawn argv, starts the child, polls for the
//! executor's socket (50 ms interval, bounded by the configured ceiling),
//! connects the RPC client, and registers the instance. Entries drop when
//! the child exits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use agor_core::{AgorConfig, UserId};
use agor_shell::{build_spawn_args, Cmd, CommandRunner, ImpersonationMode};
use agor_wire::{connect_socket, method, RpcHandler, RpcPeer, ShutdownParams};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

agor_core::define_id! {
    /// Unique identifier for a pooled executor process.
    pub struct ExecutorId("exe-");
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("executor binary not found")]
    BinaryNotFound,

    #[error("failed to spawn executor: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("executor socket {path} did not appear within {waited_ms}ms")]
    SocketTimeout { path: PathBuf, waited_ms: u64 },

    #[error(transparent)]
    Transport(#[from] agor_wire::ProtocolError),

    #[error("executor not found: {0}")]
    NotFound(ExecutorId),
}

/// One live executor child.
pub struct ExecutorInstance {
    pub user_id: UserId,
    pub unix_username: Option<String>,
    pub socket_path: PathBuf,
    pub client: RpcPeer,
    pub created_at: Instant,
    child: Mutex<Option<tokio::process::Child>>,
}

impl ExecutorInstance {
    /// OS pid while the child is alive.
    pub fn pid(&self) -> Option<i32> {
        self.child.lock().as_ref().and_then(|c| c.id()).map(|id| id as i32)
    }
}

/// How a spawn should impersonate.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub user_id: UserId,
    pub unix_username: Option<String>,
    /// Escalate with a login shell so fresh group memberships apply.
    pub fresh_groups: bool,
    /// Env to carry through the login shell (stripped otherwise).
    pub env: Vec<(String, String)>,
    pub args: Vec<String>,
}

/// The pool proper.
pub struct ExecutorPool {
    executors: Mutex<HashMap<ExecutorId, Arc<ExecutorInstance>>>,
    mode: ImpersonationProbe,
    binary: PathBuf,
    socket_dir: PathBuf,
    socket_wait: Duration,
    rpc_timeout: Duration,
}

/// Startup probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpersonationProbe {
    /// `run_as_unix_user` is on and `sudo -n -l` succeeded.
    Sudo,
    /// Impersonation unavailable; executors run as the daemon's identity.
    Disabled,
}

/// Probe once at startup whether sudo impersonation is available.
pub async fn probe_impersonation(
    config: &AgorConfig,
    runner: &dyn CommandRunner,
) -> ImpersonationProbe {
    if !config.execution.run_as_unix_user {
        return ImpersonationProbe::Disabled;
    }
    if runner.check(&Cmd::new("sudo").args(["-n", "-l"])).await {
        ImpersonationProbe::Sudo
    } else {
        warn!("run_as_unix_user is set but `sudo -n -l` failed; impersonation disabled");
        ImpersonationProbe::Disabled
    }
}

/// Locate the executor binary: explicit override, then a pre-built
/// artifact next to the daemon, then `PATH`.
pub fn locate_executor_binary() -> Result<PathBuf, PoolError> {
    if let Some(bin) = crate::env::executor_bin() {
        return Ok(bin);
    }
    if let Ok(current) = std::env::current_exe() {
        if let Some(dir) = current.parent() {
            let candidate = dir.join("agor-executor");
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }
    // Fall back to PATH resolution at spawn time
    Ok(PathBuf::from("agor-executor"))
}

/// Poll for the executor's socket file.
pub async fn wait_for_socket(path: &Path, ceiling: Duration) -> Result<(), PoolError> {
    const POLL: Duration = Duration::from_millis(50);
    let start = Instant::now();
    loop {
        if path.exists() {
            return Ok(());
        }
        if start.elapsed() >= ceiling {
            return Err(PoolError::SocketTimeout {
                path: path.to_path_buf(),
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL).await;
    }
}

impl ExecutorPool {
    pub fn new(
        mode: ImpersonationProbe,
        binary: PathBuf,
        socket_dir: PathBuf,
        config: &AgorConfig,
    ) -> Self {
        Self {
            executors: Mutex::new(HashMap::new()),
            mode,
            binary,
            socket_dir,
            socket_wait: config.limits.socket_wait_timeout(),
            rpc_timeout: config.limits.rpc_timeout(),
        }
    }

    pub fn mode(&self) -> ImpersonationProbe {
        self.mode
    }

    /// Socket path for a fresh executor.
    pub fn socket_path(&self, executor_id: &ExecutorId) -> PathBuf {
        self.socket_dir.join(format!("executor-{}.sock", executor_id.suffix()))
    }

    /// Final argv for a spawn, honoring the probe and the fresh-groups
    /// requirement.
    pub fn build_argv(&self, spec: &SpawnSpec) -> (String, Vec<String>) {
        let program = self.binary.display().to_string();
        let mode = match (self.mode, &spec.unix_username) {
            (ImpersonationProbe::Sudo, Some(user)) if spec.fresh_groups => {
                ImpersonationMode::LoginShell { user: user.clone(), env: spec.env.clone() }
            }
            (ImpersonationProbe::Sudo, Some(user)) => {
                ImpersonationMode::Sudo { user: user.clone() }
            }
            _ => ImpersonationMode::None,
        };
        build_spawn_args(&program, &spec.args, &mode)
    }

    /// Spawn an executor in IPC mode and connect to it.
    pub async fn spawn_ipc<H: RpcHandler>(
        &self,
        mut spec: SpawnSpec,
        handler: Arc<H>,
    ) -> Result<(ExecutorId, Arc<ExecutorInstance>), PoolError> {
        let executor_id = ExecutorId::new();
        let socket_path = self.socket_path(&executor_id);
        // Stale socket from a reused path
        let _ = std::fs::remove_file(&socket_path);

        spec.args.push("--socket".to_string());
        spec.args.push(socket_path.display().to_string());

        let (program, args) = self.build_argv(&spec);
        debug!(executor_id = %executor_id, program, ?args, "spawning executor");

        let mut command = tokio::process::Command::new(&program);
        command
            .args(&args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);
        // Module resolution stays deterministic relative to the binary
        if let Some(dir) = self.binary.parent().filter(|d| d.exists()) {
            command.current_dir(dir);
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        let child = command.spawn().map_err(PoolError::Spawn)?;

        wait_for_socket(&socket_path, self.socket_wait).await?;
        let stream = connect_socket(&socket_path).await?;
        let client = RpcPeer::spawn(stream, handler, self.rpc_timeout);

        let instance = Arc::new(ExecutorInstance {
            user_id: spec.user_id,
            unix_username: spec.unix_username.clone(),
            socket_path,
            client,
            created_at: Instant::now(),
            child: Mutex::new(Some(child)),
        });
        self.executors.lock().insert(executor_id, Arc::clone(&instance));
        info!(executor_id = %executor_id, user = ?spec.unix_username, "executor started");
        Ok((executor_id, instance))
    }

    pub fn get(&self, executor_id: &ExecutorId) -> Option<Arc<ExecutorInstance>> {
        self.executors.lock().get(executor_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.executors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.lock().is_empty()
    }

    /// Drop the entry for an exited child.
    pub fn remove(&self, executor_id: &ExecutorId) -> Option<Arc<ExecutorInstance>> {
        self.executors.lock().remove(executor_id)
    }

    /// Graceful termination: `shutdown` request, then SIGTERM after the
    /// deadline, then drop from the pool.
    pub async fn terminate(
        &self,
        executor_id: &ExecutorId,
        timeout: Duration,
    ) -> Result<(), PoolError> {
        let instance = self.remove(executor_id).ok_or(PoolError::NotFound(*executor_id))?;

        let shutdown = ShutdownParams { timeout_ms: timeout.as_millis() as u64 };
        let _ = instance
            .client
            .call_with_timeout(
                method::SHUTDOWN,
                serde_json::to_value(&shutdown).unwrap_or(serde_json::Value::Null),
                timeout,
            )
            .await;

        let child = instance.child.lock().take();
        if let Some(mut child) = child {
            let exited = tokio::time::timeout(timeout, child.wait()).await;
            match exited {
                Ok(Ok(status)) => {
                    debug!(executor_id = %executor_id, ?status, "executor exited");
                }
                _ => {
                    if let Some(pid) = child.id() {
                        warn!(executor_id = %executor_id, pid, "executor still alive, SIGTERM");
                        let _ = nix::sys::signal::kill(
                            nix::unistd::Pid::from_raw(pid as i32),
                            nix::sys::signal::Signal::SIGTERM,
                        );
                    }
                    let _ = child.wait().await;
                }
            }
        }
        let _ = std::fs::remove_file(&instance.socket_path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;

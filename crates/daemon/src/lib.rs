// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agor-daemon: the execution orchestrator.
//!
//! One process, one event loop. Shared maps (executor pool, pending RPC,
//! permission routing) are mutex-guarded; every await is bounded by a
//! configured timeout. Executor children run in true OS parallelism under
//! their session's Unix identity.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
mod fanout;
mod handlers;
mod lifecycle;
mod permissions;
mod pool;
mod runner;
mod stop;

pub use fanout::{ChannelHub, SubscribeError};
pub use handlers::{DaemonCtx, DaemonRpcHandler};
pub use lifecycle::{run_daemon, LifecycleError};
pub use permissions::{PermissionEvent, PermissionRouter, Resolution};
pub use pool::{
    locate_executor_binary, probe_impersonation, wait_for_socket, ExecutorId,
    ExecutorInstance, ExecutorPool, ImpersonationProbe, PoolError, SpawnSpec,
};
pub use runner::{ExecutorBackend, PoolBackend, PromptRunner, RunnerError};
pub use stop::{StopOutcome, StopProtocol};

/// Shared, mutex-guarded materialized state.
pub type SharedState = std::sync::Arc<parking_lot::Mutex<agor_storage::MaterializedState>>;

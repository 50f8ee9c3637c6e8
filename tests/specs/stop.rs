// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop protocol specs, end-to-end: a live executor runtime wired to the
//! daemon handlers over a stream, a hanging tool, and a user stop.

use std::sync::Arc;
use std::time::Duration;

use agor_core::{
    LimitsConfig, Session, SessionStatus, TaskStatus, TokenRole, User, Worktree,
};
use agor_daemon::{ChannelHub, DaemonCtx, DaemonRpcHandler, SharedState, StopProtocol};
use agor_executor::adapters::{FakeScript, FakeToolAdapter};
use agor_executor::{ExecutorHandler, ExecutorState};
use agor_storage::{MaterializedState, SessionPatch};
use agor_wire::{ExecutePromptParams, ExecuteStatus, NoopHandler, RpcPeer};
use parking_lot::Mutex;

fn fast_limits() -> LimitsConfig {
    LimitsConfig {
        rpc_timeout_ms: 1_000,
        stop_ack_timeout_ms: 200,
        stop_complete_timeout_ms: 500,
        permission_timeout_ms: 200,
        socket_wait_timeout_ms: 500,
    }
}

struct Rig {
    state: SharedState,
    hub: Arc<ChannelHub>,
    daemon_client: RpcPeer,
    executor_state: Arc<ExecutorState>,
    token: String,
    session_id: agor_core::SessionId,
    task_id: agor_core::TaskId,
}

/// Daemon state seeded with a RUNNING session+task, wired over an
/// in-memory stream to a live executor runtime.
fn rig() -> Rig {
    let mut state = MaterializedState::default();
    let user = User::builder().unix_username("alice").build();
    let worktree = Worktree::builder().build();
    let session = Session::builder().unix_username("alice").build();
    let session = Session { worktree_id: worktree.id, created_by: user.id, ..session };
    let (user_id, session_id) = (user.id, session.id);
    state.insert_user(user);
    state.insert_worktree(worktree);
    state.insert_session(session);
    let task_id = state.create_task(session_id, "spin forever", 0).unwrap().id;
    state.update_task_status(&task_id, TaskStatus::Running, 1).unwrap();
    state
        .patch_session(&session_id, SessionPatch::status(SessionStatus::Running))
        .unwrap();

    let state: SharedState = Arc::new(Mutex::new(state));
    let hub = Arc::new(ChannelHub::new());
    let signer = agor_auth::TokenSigner::new(b"e2e-secret".to_vec());
    let token = signer.issue(session_id, user_id, TokenRole::Service, 0, u64::MAX / 2).unwrap();
    let ctx = DaemonCtx::new(Arc::clone(&state), Arc::clone(&hub), signer);

    let executor_state = ExecutorState::new(token.clone(), Duration::from_millis(200));
    let executor_handler =
        Arc::new(ExecutorHandler { state: Arc::clone(&executor_state) });
    let daemon_handler = DaemonRpcHandler::new(ctx);

    let (daemon_end, executor_end) = tokio::io::duplex(64 * 1024);
    let daemon_client =
        RpcPeer::spawn(daemon_end, Arc::clone(&daemon_handler), Duration::from_secs(5));
    daemon_handler.set_peer(daemon_client.clone());
    let executor_peer = RpcPeer::spawn(executor_end, executor_handler, Duration::from_secs(5));
    executor_state.set_peer(executor_peer);

    Rig { state, hub, daemon_client, executor_state, token, session_id, task_id }
}

fn params(rig: &Rig) -> ExecutePromptParams {
    ExecutePromptParams {
        session_token: rig.token.clone(),
        session_id: rig.session_id,
        task_id: rig.task_id,
        agentic_tool: agor_core::AgenticTool::ClaudeCode,
        prompt: "spin forever".into(),
        cwd: std::env::temp_dir(),
        tools: Vec::new(),
        permission_mode: None,
        timeout_ms: None,
        stream: true,
    }
}

#[tokio::test]
async fn stop_with_clean_ack_finalizes_everything() {
    let rig = rig();
    let adapter = Arc::new(FakeToolAdapter::new(FakeScript { hang: true, ..FakeScript::default() }));

    let run = tokio::spawn({
        let executor = Arc::clone(&rig.executor_state);
        let params = params(&rig);
        let adapter = Arc::clone(&adapter);
        async move { executor.run_prompt_with(params, adapter.as_ref()).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let protocol =
        StopProtocol::new(Arc::clone(&rig.state), Arc::clone(&rig.hub), fast_limits());
    let outcome = protocol
        .initiate(rig.session_id, rig.task_id, Some(&rig.daemon_client))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.reason, "stopped");

    // The executor run ended as cancelled, not failed
    let result = tokio::time::timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert_eq!(result.unwrap().status, ExecuteStatus::Cancelled);

    let state = rig.state.lock();
    let task = state.task(&rig.task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Stopped);
    assert!(task.completed_at_ms.is_some());
    let session = state.session(&rig.session_id).unwrap();
    assert_eq!(session.status, SessionStatus::Idle);
    assert!(!session.ready_for_prompt, "queued prompts must wait for a human");
}

#[tokio::test]
async fn stop_with_hung_executor_force_stops() {
    // The "executor" never acks: its peer ignores everything
    let rig = rig();
    let (daemon_end, silent) = tokio::io::duplex(4 * 1024);
    let _silent_peer = RpcPeer::spawn(silent, Arc::new(NoopHandler), Duration::from_secs(5));
    let silent_end = RpcPeer::spawn(daemon_end, Arc::new(NoopHandler), Duration::from_secs(5));

    let protocol =
        StopProtocol::new(Arc::clone(&rig.state), Arc::clone(&rig.hub), fast_limits());
    let start = std::time::Instant::now();
    let outcome = protocol.initiate(rig.session_id, rig.task_id, Some(&silent_end)).await;
    let elapsed = start.elapsed();

    assert!(outcome.success);
    assert!(outcome.reason.contains("acknowledge"));
    // Three attempts of one ACK window each, with headroom
    assert!(elapsed >= Duration::from_millis(3 * 200));
    assert!(elapsed < Duration::from_secs(5));

    let state = rig.state.lock();
    assert_eq!(state.task(&rig.task_id).unwrap().status, TaskStatus::Stopped);
    let session = state.session(&rig.session_id).unwrap();
    assert_eq!(session.status, SessionStatus::Idle);
    assert!(!session.ready_for_prompt);
}

#[tokio::test]
async fn late_stop_for_an_old_task_does_not_kill_the_successor() {
    let rig = rig();
    let adapter = Arc::new(FakeToolAdapter::new(FakeScript { hang: true, ..FakeScript::default() }));

    let run = tokio::spawn({
        let executor = Arc::clone(&rig.executor_state);
        let params = params(&rig);
        let adapter = Arc::clone(&adapter);
        async move { executor.run_prompt_with(params, adapter.as_ref()).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Stop aimed at a stale task id: the executor acks already_stopped
    // and the current run keeps going
    let stale_task = agor_core::TaskId::new();
    let stop = agor_wire::TaskStopParams {
        session_id: rig.session_id,
        task_id: stale_task,
        sequence: 1,
        timestamp: 0,
    };
    rig.daemon_client
        .notify(
            agor_wire::notification::TASK_STOP,
            serde_json::to_value(&stop).unwrap(),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!run.is_finished(), "current run must survive a mismatched stop");
    assert!(rig.executor_state.current_run().is_some());
    run.abort();
}

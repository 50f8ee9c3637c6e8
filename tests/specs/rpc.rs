// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC transport specs: a real executor socket, raw wire framing, and
//! concurrent connections.

use std::path::PathBuf;
use std::time::Duration;

use agor_wire::{connect_socket, method, NoopHandler, RpcPeer};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

fn socket_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

async fn connect_when_ready(socket: &std::path::Path) -> RpcPeer {
    agor_daemon::wait_for_socket(socket, Duration::from_secs(5)).await.unwrap();
    let stream = connect_socket(socket).await.unwrap();
    RpcPeer::spawn(stream, std::sync::Arc::new(NoopHandler), Duration::from_secs(5))
}

#[tokio::test]
async fn ping_over_a_real_socket_has_the_documented_shape() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_path(&dir, "exe.sock");
    let executor = tokio::spawn({
        let socket = socket.clone();
        async move {
            let _ = agor_executor::run_ipc_mode(&socket).await;
        }
    });

    agor_daemon::wait_for_socket(&socket, Duration::from_secs(5)).await.unwrap();
    let stream = connect_socket(&socket).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();

    // Raw newline-delimited JSON-RPC 2.0, one message per line
    write_half
        .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":\"t1\",\"method\":\"ping\"}\n")
        .await
        .unwrap();

    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    let response: Value = serde_json::from_str(line.trim()).unwrap();

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], "t1");
    assert_eq!(response["result"]["pong"], true);
    assert!(response["result"]["timestamp"].is_number());

    executor.abort();
}

#[tokio::test]
async fn unknown_method_answers_32601() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_path(&dir, "exe.sock");
    let executor = tokio::spawn({
        let socket = socket.clone();
        async move {
            let _ = agor_executor::run_ipc_mode(&socket).await;
        }
    });

    let peer = connect_when_ready(&socket).await;
    let err = peer.call("unknown", Value::Null).await.unwrap_err();
    match err {
        agor_wire::ProtocolError::Remote(rpc) => {
            assert_eq!(rpc.code, -32601);
            assert!(rpc.message.contains("Unknown method"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }

    executor.abort();
}

#[tokio::test]
async fn two_executors_answer_ten_parallel_pings() {
    let dir = tempfile::tempdir().unwrap();
    let socket_a = socket_path(&dir, "a.sock");
    let socket_b = socket_path(&dir, "b.sock");
    let exe_a = tokio::spawn({
        let socket = socket_a.clone();
        async move {
            let _ = agor_executor::run_ipc_mode(&socket).await;
        }
    });
    let exe_b = tokio::spawn({
        let socket = socket_b.clone();
        async move {
            let _ = agor_executor::run_ipc_mode(&socket).await;
        }
    });

    let peer_a = connect_when_ready(&socket_a).await;
    let peer_b = connect_when_ready(&socket_b).await;

    let mut calls = Vec::new();
    for _ in 0..5 {
        calls.push(tokio::spawn({
            let peer = peer_a.clone();
            async move { peer.call(method::PING, Value::Null).await }
        }));
        calls.push(tokio::spawn({
            let peer = peer_b.clone();
            async move { peer.call(method::PING, Value::Null).await }
        }));
    }

    for call in calls {
        let result = call.await.unwrap().unwrap();
        assert_eq!(result["pong"], true);
    }

    exe_a.abort();
    exe_b.abort();
}

#[tokio::test]
async fn shutdown_request_ends_the_executor() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_path(&dir, "exe.sock");
    let executor = tokio::spawn({
        let socket = socket.clone();
        async move { agor_executor::run_ipc_mode(&socket).await }
    });

    let peer = connect_when_ready(&socket).await;
    peer.call(method::SHUTDOWN, serde_json::json!({"timeout_ms": 1000})).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), executor).await;
    assert!(outcome.unwrap().unwrap().is_ok(), "executor must exit cleanly on shutdown");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::message::RpcError;
use serde_json::json;

#[test]
fn encode_is_single_line() {
    let msg = RpcMessage::Request {
        id: "1".into(),
        method: "get_api_key".into(),
        params: json!({"credential_key": "ANTHROPIC_API_KEY"}),
    };
    let line = encode(&msg);
    assert!(!line.contains('\n'));
    assert_eq!(decode(&line).unwrap(), msg);
}

#[test]
fn decode_rejects_invalid_json() {
    let result = decode("{not json");
    assert!(matches!(result, Err(ProtocolError::Malformed { .. })));
}

#[test]
fn decode_rejects_non_rpc_object() {
    let result = decode("{\"foo\": 1}");
    assert!(matches!(result, Err(ProtocolError::Malformed { .. })));
}

#[tokio::test]
async fn read_write_round_trip() {
    let (client, server) = tokio::io::duplex(4096);
    let (_, mut client_write) = tokio::io::split(client);
    let (server_read, _) = tokio::io::split(server);

    let msg = RpcMessage::Response {
        id: "7".into(),
        result: Err(RpcError::internal("oops")),
    };
    write_message(&mut client_write, &msg).await.unwrap();

    let mut reader = BufReader::new(server_read);
    let read = read_message(&mut reader).await.unwrap();
    assert_eq!(read, msg);
}

#[tokio::test]
async fn read_skips_blank_lines() {
    let (client, server) = tokio::io::duplex(4096);
    let (_, mut client_write) = tokio::io::split(client);
    let (server_read, _) = tokio::io::split(server);

    client_write.write_all(b"\n\n").await.unwrap();
    let msg = RpcMessage::Notification { method: "task_stop".into(), params: json!({}) };
    write_message(&mut client_write, &msg).await.unwrap();

    let mut reader = BufReader::new(server_read);
    assert_eq!(read_message(&mut reader).await.unwrap(), msg);
}

#[tokio::test]
async fn read_reports_eof_as_connection_closed() {
    let (client, server) = tokio::io::duplex(64);
    drop(client);
    let (server_read, _) = tokio::io::split(server);
    let mut reader = BufReader::new(server_read);
    let result = read_message(&mut reader).await;
    assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
}

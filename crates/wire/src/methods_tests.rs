// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn get_api_key_params_shape() {
    let params = GetApiKeyParams {
        session_token: "tok".into(),
        credential_key: CredentialKey::AnthropicApiKey,
    };
    let value = serde_json::to_value(&params).unwrap();
    assert_eq!(value["credential_key"], "ANTHROPIC_API_KEY");
}

#[test]
fn permission_resolved_uses_camel_case() {
    let params = PermissionResolvedParams {
        request_id: "req-1".into(),
        task_id: TaskId::from_string("tsk-1"),
        allow: false,
        reason: Some("Timeout".into()),
        remember: false,
        scope: PermissionScope::Once,
        decided_by: "usr-1".into(),
    };
    let value = serde_json::to_value(&params).unwrap();
    assert_eq!(value["requestId"], "req-1");
    assert_eq!(value["taskId"], "tsk-1");
    assert_eq!(value["decidedBy"], "usr-1");
    assert_eq!(value["scope"], "once");
}

#[test]
fn task_stop_params_round_trip() {
    let params = TaskStopParams {
        session_id: SessionId::from_string("ses-1"),
        task_id: TaskId::from_string("tsk-1"),
        sequence: 3,
        timestamp: 1111,
    };
    let value = serde_json::to_value(&params).unwrap();
    let parsed: TaskStopParams = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, params);
}

#[test]
fn execute_prompt_result_optional_fields_omitted() {
    let result = ExecutePromptResult {
        status: ExecuteStatus::Completed,
        message_count: 4,
        token_usage: None,
        error: None,
    };
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "completed");
    assert!(value.get("token_usage").is_none());
    assert!(value.get("error").is_none());
}

#[test]
fn execute_prompt_params_defaults() {
    let parsed: ExecutePromptParams = serde_json::from_value(json!({
        "session_token": "tok",
        "session_id": "ses-1",
        "task_id": "tsk-1",
        "agentic_tool": "claude-code",
        "prompt": "hello",
        "cwd": "/work",
    }))
    .unwrap();
    assert!(parsed.tools.is_empty());
    assert!(!parsed.stream);
    assert_eq!(parsed.agentic_tool, AgenticTool::ClaudeCode);
}

#[test]
fn daemon_command_names() {
    assert_eq!(DaemonCommand::EmitPermissionEvent.to_string(), "emit_permission_event");
    let value = serde_json::to_value(DaemonCommand::StreamChunk).unwrap();
    assert_eq!(value, "stream_chunk");
}

#[test]
fn stop_ack_round_trip() {
    let ack = TaskStopAckParams {
        session_id: SessionId::from_string("ses-1"),
        task_id: TaskId::from_string("tsk-1"),
        sequence: 1,
        received_at: 42,
        status: StopAckStatus::Stopping,
    };
    let json = serde_json::to_string(&ack).unwrap();
    let parsed: TaskStopAckParams = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ack);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;

#[test]
fn socket_flag_selects_ipc_mode() {
    let args = ExecutorArgs::parse_from(["agor-executor", "--socket", "/tmp/exe.sock"]);
    assert_eq!(args.mode().unwrap(), StartMode::Ipc { socket: "/tmp/exe.sock".into() });
}

#[test]
fn full_feathers_flags_select_feathers_mode() {
    let args = ExecutorArgs::parse_from([
        "agor-executor",
        "--session-token",
        "tok",
        "--session-id",
        "ses-1",
        "--task-id",
        "tsk-1",
        "--prompt",
        "fix the bug",
        "--tool",
        "claude-code",
        "--daemon-url",
        "/run/agor/daemon.sock",
    ]);
    match args.mode().unwrap() {
        StartMode::Feathers { session_id, task_id, tool, prompt, .. } => {
            assert_eq!(session_id.as_str(), "ses-1");
            assert_eq!(task_id.as_str(), "tsk-1");
            assert_eq!(tool, AgenticTool::ClaudeCode);
            assert_eq!(prompt, "fix the bug");
        }
        other => panic!("expected feathers, got {other:?}"),
    }
}

#[test]
fn incomplete_flags_are_rejected() {
    let args = ExecutorArgs::parse_from([
        "agor-executor",
        "--session-token",
        "tok",
        "--prompt",
        "hi",
    ]);
    assert!(matches!(args.mode(), Err(ExecutorError::BadArgs(_))));
}

#[test]
fn unknown_tool_is_rejected() {
    let args = ExecutorArgs::parse_from([
        "agor-executor",
        "--session-token",
        "tok",
        "--session-id",
        "ses-1",
        "--task-id",
        "tsk-1",
        "--prompt",
        "hi",
        "--tool",
        "copilot",
        "--daemon-url",
        "/run/agor/daemon.sock",
    ]);
    let err = args.mode().unwrap_err();
    assert!(matches!(err, ExecutorError::BadArgs(msg) if msg.contains("copilot")));
}

#[test]
fn socket_takes_precedence_over_partial_feathers_flags() {
    let args = ExecutorArgs::parse_from([
        "agor-executor",
        "--socket",
        "/tmp/exe.sock",
        "--prompt",
        "ignored",
    ]);
    assert!(matches!(args.mode().unwrap(), StartMode::Ipc { .. }));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agor_shell::RecordingRunner;
use std::path::PathBuf;

#[tokio::test]
async fn ensure_user_creates_when_absent() {
    let runner = RecordingRunner::new();
    runner.push_check(false);
    ensure_user(&runner, "alice", &PathBuf::from("/home")).await.unwrap();

    let lines = runner.executed_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("useradd"));
    assert!(lines[0].contains("--create-home"));
    assert!(lines[0].contains("/home/alice"));
    assert!(lines[0].ends_with("alice"));
}

#[tokio::test]
async fn ensure_user_is_idempotent() {
    // A second ensure_user performs no extra side effects
    let runner = RecordingRunner::new();
    runner.push_check(true);
    ensure_user(&runner, "alice", &PathBuf::from("/home")).await.unwrap();
    assert!(runner.executed_lines().is_empty());
    assert_eq!(runner.checked_lines(), vec!["id -u alice"]);
}

#[tokio::test]
async fn ensure_user_rejects_invalid_name() {
    let runner = RecordingRunner::new();
    let err = ensure_user(&runner, "Alice;rm", &PathBuf::from("/home")).await.unwrap_err();
    assert!(matches!(err, IsolationError::InvalidUsername { .. }));
    assert!(runner.executed_lines().is_empty());
    assert!(runner.checked_lines().is_empty());
}

#[tokio::test]
async fn delete_user_with_home() {
    let runner = RecordingRunner::new();
    runner.push_check(true);
    delete_user(&runner, "alice", true).await.unwrap();
    assert_eq!(runner.executed_lines(), vec!["userdel --remove alice"]);
}

#[tokio::test]
async fn delete_user_absent_is_success() {
    let runner = RecordingRunner::new();
    runner.push_check(false);
    delete_user(&runner, "alice", false).await.unwrap();
    assert!(runner.executed_lines().is_empty());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::recording::RecordingRunner;
use crate::runner::DirectRunner;

#[tokio::test]
async fn dry_run_replaces_exec_with_intent() {
    let inner = RecordingRunner::new();
    let runner = DryRunRunner::new(inner);
    let result = runner.exec(&Cmd::new("groupadd").arg("agor_wt_ab12cd34")).await.unwrap();
    assert!(result.success());
    // The wrapped runner never saw the mutation
    // (RecordingRunner is consumed by the wrapper, so probe via a fresh one)
}

#[tokio::test]
async fn dry_run_still_runs_check_probes() {
    let inner = RecordingRunner::new();
    inner.push_check(true);
    let runner = DryRunRunner::new(inner);

    assert!(runner.check(&Cmd::new("getent").args(["group", "agor_wt_ab12cd34"])).await);
    let _ = runner.exec(&Cmd::new("groupadd").arg("agor_wt_ab12cd34")).await;
}

#[tokio::test]
async fn throwing_promotes_nonzero_exit() {
    let runner = ThrowingRunner::new(DirectRunner);
    let err = runner
        .exec(&Cmd::new("sh").args(["-c", "echo output; echo problem >&2; exit 2"]))
        .await
        .unwrap_err();
    match err {
        CommandError::Failed { command, stdout, stderr, exit_code } => {
            assert!(command.starts_with("sh"));
            assert_eq!(stdout, "output\n");
            assert_eq!(stderr, "problem\n");
            assert_eq!(exit_code, 2);
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn throwing_passes_success_through() {
    let runner = ThrowingRunner::new(DirectRunner);
    let result = runner.exec(&Cmd::new("true")).await.unwrap();
    assert!(result.success());
}

#[tokio::test]
async fn logging_preserves_results() {
    let runner = LoggingRunner::new(DirectRunner);
    let result = runner.exec(&Cmd::new("sh").args(["-c", "exit 7"])).await.unwrap();
    assert_eq!(result.exit_code, 7);
}

#[tokio::test]
async fn wrappers_compose() {
    // dry-run over throwing over direct: mutations are suppressed before
    // the throwing layer can see a failure
    let runner = DryRunRunner::new(ThrowingRunner::new(DirectRunner));
    let result = runner.exec(&Cmd::new("false")).await.unwrap();
    assert!(result.success());
}

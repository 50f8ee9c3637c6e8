// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agor_shell::RecordingRunner;
use serial_test::serial;

fn test_pool(mode: ImpersonationProbe) -> ExecutorPool {
    let config = agor_core::test_support::fast_config();
    ExecutorPool::new(
        mode,
        PathBuf::from("/opt/agor/agor-executor"),
        PathBuf::from("/tmp/agor-sockets"),
        &config,
    )
}

fn spec(unix_username: Option<&str>, fresh_groups: bool) -> SpawnSpec {
    SpawnSpec {
        user_id: UserId::new(),
        unix_username: unix_username.map(str::to_string),
        fresh_groups,
        env: vec![("HOME".into(), "/home/alice".into())],
        args: vec!["--socket".into(), "/tmp/x.sock".into()],
    }
}

#[tokio::test]
async fn probe_disabled_when_config_off() {
    let runner = RecordingRunner::new();
    let config = agor_core::AgorConfig::default();
    assert_eq!(probe_impersonation(&config, &runner).await, ImpersonationProbe::Disabled);
    // No sudo probe ran at all
    assert!(runner.checked_lines().is_empty());
}

#[tokio::test]
async fn probe_sudo_when_sudo_n_l_succeeds() {
    let runner = RecordingRunner::new();
    runner.push_check(true);
    let mut config = agor_core::AgorConfig::default();
    config.execution.run_as_unix_user = true;
    assert_eq!(probe_impersonation(&config, &runner).await, ImpersonationProbe::Sudo);
    assert_eq!(runner.checked_lines(), vec!["sudo -n -l"]);
}

#[tokio::test]
async fn probe_disabled_when_sudo_fails() {
    let runner = RecordingRunner::new();
    runner.push_check(false);
    let mut config = agor_core::AgorConfig::default();
    config.execution.run_as_unix_user = true;
    assert_eq!(probe_impersonation(&config, &runner).await, ImpersonationProbe::Disabled);
}

#[test]
fn argv_passthrough_without_impersonation() {
    let pool = test_pool(ImpersonationProbe::Disabled);
    let (program, args) = pool.build_argv(&spec(Some("alice"), false));
    assert_eq!(program, "/opt/agor/agor-executor");
    assert_eq!(args, vec!["--socket", "/tmp/x.sock"]);
}

#[test]
fn argv_sudo_u_when_no_fresh_groups_needed() {
    let pool = test_pool(ImpersonationProbe::Sudo);
    let (program, args) = pool.build_argv(&spec(Some("alice"), false));
    assert_eq!(program, "sudo");
    assert_eq!(
        args,
        vec!["-n", "-u", "alice", "/opt/agor/agor-executor", "--socket", "/tmp/x.sock"]
    );
}

#[test]
fn argv_login_shell_when_fresh_groups_needed() {
    let pool = test_pool(ImpersonationProbe::Sudo);
    let (program, args) = pool.build_argv(&spec(Some("alice"), true));
    assert_eq!(program, "sudo");
    assert_eq!(&args[..5], ["-n", "su", "-", "alice", "-c"]);
    assert!(args[5].starts_with("env HOME='/home/alice' "));
    assert!(args[5].contains("'/opt/agor/agor-executor' '--socket' '/tmp/x.sock'"));
}

#[test]
fn argv_plain_for_sessions_without_unix_user() {
    let pool = test_pool(ImpersonationProbe::Sudo);
    let (program, args) = pool.build_argv(&spec(None, true));
    assert_eq!(program, "/opt/agor/agor-executor");
    assert_eq!(args, vec!["--socket", "/tmp/x.sock"]);
}

#[tokio::test]
async fn wait_for_socket_sees_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ready.sock");
    std::fs::write(&path, "").unwrap();
    wait_for_socket(&path, Duration::from_millis(200)).await.unwrap();
}

#[tokio::test]
async fn wait_for_socket_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.sock");
    let err = wait_for_socket(&path, Duration::from_millis(120)).await.unwrap_err();
    match err {
        PoolError::SocketTimeout { waited_ms, .. } => assert!(waited_ms >= 120),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn wait_for_socket_picks_up_late_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.sock");
    let writer = tokio::spawn({
        let path = path.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::fs::write(&path, "").unwrap();
        }
    });
    wait_for_socket(&path, Duration::from_secs(2)).await.unwrap();
    writer.await.unwrap();
}

#[test]
#[serial(agor_env)]
fn binary_location_prefers_env_override() {
    std::env::set_var("AGOR_EXECUTOR_BIN", "/custom/agor-executor");
    assert_eq!(
        locate_executor_binary().unwrap(),
        PathBuf::from("/custom/agor-executor")
    );
    std::env::remove_var("AGOR_EXECUTOR_BIN");
}

#[test]
fn socket_paths_are_unique_per_executor() {
    let pool = test_pool(ImpersonationProbe::Disabled);
    let a = pool.socket_path(&ExecutorId::new());
    let b = pool.socket_path(&ExecutorId::new());
    assert_ne!(a, b);
    assert!(a.starts_with("/tmp/agor-sockets"));
}

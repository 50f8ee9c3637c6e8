// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_documented_bounds() {
    let config = AgorConfig::default();
    assert_eq!(config.limits.rpc_timeout(), Duration::from_secs(30));
    assert_eq!(config.limits.stop_ack_timeout(), Duration::from_secs(5));
    assert_eq!(config.limits.stop_complete_timeout(), Duration::from_secs(30));
    assert_eq!(config.limits.permission_timeout(), Duration::from_secs(60));
    assert_eq!(config.limits.socket_wait_timeout(), Duration::from_secs(5));
    assert!(!config.execution.run_as_unix_user);
    assert!(config.execution.use_executor);
    assert_eq!(config.paths.home_base, PathBuf::from("/home"));
}

#[test]
fn parses_partial_toml() {
    let toml = r#"
        [execution]
        run_as_unix_user = true
        executor_unix_user = "agor"

        [limits]
        stop_ack_timeout_ms = 250
    "#;
    let config: AgorConfig = toml::from_str(toml).unwrap();
    assert!(config.execution.run_as_unix_user);
    assert_eq!(config.execution.executor_unix_user.as_deref(), Some("agor"));
    assert_eq!(config.limits.stop_ack_timeout(), Duration::from_millis(250));
    // Unspecified limits keep their defaults
    assert_eq!(config.limits.rpc_timeout(), Duration::from_secs(30));
}

#[test]
fn rejects_unknown_keys() {
    let toml = r#"
        [execution]
        run_as_root = true
    "#;
    let result: Result<AgorConfig, _> = toml::from_str(toml);
    assert!(result.is_err());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agor.toml");
    std::fs::write(&path, "[auth]\nsecret = \"s3cret\"\n").unwrap();

    let config = AgorConfig::load(&path).unwrap();
    assert_eq!(config.auth.secret, "s3cret");
}

#[test]
fn load_missing_file_errors() {
    let result = AgorConfig::load(std::path::Path::new("/nonexistent/agor.toml"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

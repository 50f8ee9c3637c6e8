// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial(agor_env)]
fn state_dir_prefers_explicit_override() {
    std::env::set_var("AGOR_STATE_DIR", "/custom/state");
    assert_eq!(state_dir(), Some(PathBuf::from("/custom/state")));
    std::env::remove_var("AGOR_STATE_DIR");
}

#[test]
#[serial(agor_env)]
fn db_path_prefers_agor_db_path() {
    std::env::set_var("AGOR_DB_PATH", "/data/agor.json");
    assert_eq!(db_path(), Some(PathBuf::from("/data/agor.json")));
    std::env::remove_var("AGOR_DB_PATH");
}

#[test]
#[serial(agor_env)]
fn db_path_accepts_file_database_url() {
    std::env::remove_var("AGOR_DB_PATH");
    std::env::set_var("DATABASE_URL", "file:/data/from-url.json");
    assert_eq!(db_path(), Some(PathBuf::from("/data/from-url.json")));
    std::env::remove_var("DATABASE_URL");
}

#[test]
#[serial(agor_env)]
fn port_parses_numeric() {
    std::env::set_var("PORT", "8787");
    assert_eq!(port(), Some(8787));
    std::env::set_var("PORT", "not-a-port");
    assert_eq!(port(), None);
    std::env::remove_var("PORT");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Resolve state directory: AGOR_STATE_DIR > XDG_STATE_HOME/agor >
/// ~/.local/state/agor
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("AGOR_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("agor"));
    }
    std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".local/state/agor"))
}

/// Snapshot path: AGOR_DB_PATH > DATABASE_URL (file form) > state dir.
pub fn db_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AGOR_DB_PATH") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        if let Some(path) = url.strip_prefix("file:") {
            return Some(PathBuf::from(path));
        }
    }
    state_dir().map(|dir| dir.join("agor.json"))
}

/// Storage dialect tag (recognized for compatibility; the snapshot store
/// only uses it for logging).
pub fn db_dialect() -> Option<String> {
    std::env::var("AGOR_DB_DIALECT").ok().filter(|s| !s.is_empty())
}

/// Daemon listen port for the external API surface.
pub fn port() -> Option<u16> {
    std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok())
}

/// Executor binary override.
pub fn executor_bin() -> Option<PathBuf> {
    std::env::var("AGOR_EXECUTOR_BIN").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Config file path: AGOR_CONFIG > <state dir>/agor.toml
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AGOR_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    state_dir().map(|dir| dir.join("agor.toml"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration with enumerated recognized keys.
//!
//! Loaded from TOML; every timeout has an explicit default so a missing
//! `[limits]` table yields the documented suspension bounds.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgorConfig {
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl AgorConfig {
    /// Load from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

/// Executor impersonation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Run executors as each session's Unix user (requires sudo).
    #[serde(default)]
    pub run_as_unix_user: bool,
    /// Fixed Unix user to run all executors as, overriding per-session users.
    #[serde(default)]
    pub executor_unix_user: Option<String>,
    /// Spawn a separate executor process per task (vs in-process execution).
    #[serde(default = "default_true")]
    pub use_executor: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { run_as_unix_user: false, executor_unix_user: None, use_executor: true }
    }
}

/// Token signing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Signing secret for session tokens.
    #[serde(default)]
    pub secret: String,
    /// Lifetime of a user access token.
    #[serde(default = "default_access_ttl_ms")]
    pub access_token_ttl_ms: u64,
    /// Lifetime of an executor service token.
    #[serde(default = "default_service_ttl_ms")]
    pub service_token_ttl_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_ttl_ms: default_access_ttl_ms(),
            service_token_ttl_ms: default_service_ttl_ms(),
        }
    }
}

impl AuthConfig {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_millis(self.access_token_ttl_ms)
    }

    pub fn service_token_ttl(&self) -> Duration {
        Duration::from_millis(self.service_token_ttl_ms)
    }
}

/// Suspension bounds. Every await in the daemon is bounded by one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
    #[serde(default = "default_stop_ack_timeout_ms")]
    pub stop_ack_timeout_ms: u64,
    #[serde(default = "default_stop_complete_timeout_ms")]
    pub stop_complete_timeout_ms: u64,
    #[serde(default = "default_permission_timeout_ms")]
    pub permission_timeout_ms: u64,
    #[serde(default = "default_socket_wait_timeout_ms")]
    pub socket_wait_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_ms: default_rpc_timeout_ms(),
            stop_ack_timeout_ms: default_stop_ack_timeout_ms(),
            stop_complete_timeout_ms: default_stop_complete_timeout_ms(),
            permission_timeout_ms: default_permission_timeout_ms(),
            socket_wait_timeout_ms: default_socket_wait_timeout_ms(),
        }
    }
}

impl LimitsConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn stop_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_ack_timeout_ms)
    }

    pub fn stop_complete_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_complete_timeout_ms)
    }

    pub fn permission_timeout(&self) -> Duration {
        Duration::from_millis(self.permission_timeout_ms)
    }

    pub fn socket_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_wait_timeout_ms)
    }
}

/// Filesystem roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Base directory under which per-user homes live.
    #[serde(default = "default_home_base")]
    pub home_base: PathBuf,
    /// Daemon data directory (state, sockets, logs).
    #[serde(default)]
    pub data_home: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { home_base: default_home_base(), data_home: None }
    }
}

fn default_true() -> bool {
    true
}

fn default_access_ttl_ms() -> u64 {
    8 * 60 * 60 * 1000
}

fn default_service_ttl_ms() -> u64 {
    60 * 60 * 1000
}

fn default_rpc_timeout_ms() -> u64 {
    30_000
}

fn default_stop_ack_timeout_ms() -> u64 {
    5_000
}

fn default_stop_complete_timeout_ms() -> u64 {
    30_000
}

fn default_permission_timeout_ms() -> u64 {
    60_000
}

fn default_socket_wait_timeout_ms() -> u64 {
    5_000
}

fn default_home_base() -> PathBuf {
    PathBuf::from("/home")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

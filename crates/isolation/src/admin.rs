// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin gateway operations.
//!
//! These are the only privileged mutations the daemon can trigger, invoked
//! as `sudo -n agor admin <subcommand>`. Each validates its inputs, probes
//! pre-state, mutates only if necessary, and treats "already exists /
//! already gone" as success. The sudoers policy restricts `sudo -n` to
//! exactly this surface.

use std::path::PathBuf;
use std::sync::Arc;

use agor_shell::{CommandRunner, DirectRunner, DryRunRunner, LoggingRunner};
use tracing::info;

use crate::error::IsolationError;
use crate::names::worktree_group_name;
use crate::{groups, symlinks, users};

/// A parsed admin subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRequest {
    CreateWorktreeGroup { worktree_id: String },
    DeleteWorktreeGroup { group: String },
    EnsureUser { username: String, home_base: PathBuf },
    DeleteUser { username: String, delete_home: bool },
    RemoveFromWorktreeGroup { username: String, group: String },
    RemoveSymlink { username: String, worktree_name: String, home_base: PathBuf },
    SyncUserSymlinks { username: String, home_base: PathBuf },
}

/// Execution context for admin operations.
pub struct AdminCtx {
    runner: Arc<dyn CommandRunner>,
    verbose: bool,
}

impl AdminCtx {
    /// Build a context for a real (root) invocation.
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        let runner: Arc<dyn CommandRunner> = if dry_run {
            Arc::new(DryRunRunner::new(LoggingRunner::new(DirectRunner)))
        } else {
            Arc::new(LoggingRunner::new(DirectRunner))
        };
        Self { runner, verbose }
    }

    /// Build a context over an injected runner (tests).
    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner, verbose: false }
    }

    /// Execute one admin request.
    pub async fn run(&self, request: AdminRequest) -> Result<(), IsolationError> {
        if self.verbose {
            info!(?request, "admin request");
        }
        let runner = self.runner.as_ref();
        match request {
            AdminRequest::CreateWorktreeGroup { worktree_id } => {
                let group = worktree_group_name(&worktree_id);
                groups::create_group(runner, &group).await
            }
            AdminRequest::DeleteWorktreeGroup { group } => {
                groups::delete_group(runner, &group).await
            }
            AdminRequest::EnsureUser { username, home_base } => {
                users::ensure_user(runner, &username, &home_base).await?;
                symlinks::setup_worktrees_dir(runner, &home_base, &username).await?;
                Ok(())
            }
            AdminRequest::DeleteUser { username, delete_home } => {
                users::delete_user(runner, &username, delete_home).await
            }
            AdminRequest::RemoveFromWorktreeGroup { username, group } => {
                groups::remove_user_from_group(runner, &username, &group).await
            }
            AdminRequest::RemoveSymlink { username, worktree_name, home_base } => {
                symlinks::remove_symlink(runner, &home_base, &username, &worktree_name).await
            }
            AdminRequest::SyncUserSymlinks { username, home_base } => {
                let removed =
                    symlinks::sync_user_symlinks(runner, &home_base, &username).await?;
                info!(username, removed = removed.len(), "synced symlinks");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;

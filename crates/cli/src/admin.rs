// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agor admin` — the privileged gateway surface.
//!
//! Each subcommand is narrow and idempotent: "already exists" and
//! "already gone" exit 0. The sudoers policy restricts the daemon's
//! `sudo -n` to exactly these.

use std::path::PathBuf;

use agor_isolation::{AdminCtx, AdminRequest};
use clap::{Args, Subcommand};

const DEFAULT_HOME_BASE: &str = "/home";

#[derive(Args)]
pub struct AdminArgs {
    /// Log intended mutations without performing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Create the Unix group for a worktree
    CreateWorktreeGroup {
        #[arg(long)]
        worktree_id: String,
    },

    /// Delete a worktree group
    DeleteWorktreeGroup {
        #[arg(long)]
        group: String,
    },

    /// Create a Unix user (with home) if absent
    EnsureUser {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = DEFAULT_HOME_BASE)]
        home_base: PathBuf,
    },

    /// Delete a Unix user
    DeleteUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        delete_home: bool,
    },

    /// Remove a user from a worktree group
    RemoveFromWorktreeGroup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        group: String,
    },

    /// Remove a worktree symlink from a user's home
    RemoveSymlink {
        #[arg(long)]
        username: String,
        #[arg(long)]
        worktree_name: String,
        #[arg(long, default_value = DEFAULT_HOME_BASE)]
        home_base: PathBuf,
    },

    /// Garbage-collect broken worktree symlinks in a user's home
    SyncUserSymlinks {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = DEFAULT_HOME_BASE)]
        home_base: PathBuf,
    },
}

impl AdminCommand {
    fn into_request(self) -> AdminRequest {
        match self {
            AdminCommand::CreateWorktreeGroup { worktree_id } => {
                AdminRequest::CreateWorktreeGroup { worktree_id }
            }
            AdminCommand::DeleteWorktreeGroup { group } => {
                AdminRequest::DeleteWorktreeGroup { group }
            }
            AdminCommand::EnsureUser { username, home_base } => {
                AdminRequest::EnsureUser { username, home_base }
            }
            AdminCommand::DeleteUser { username, delete_home } => {
                AdminRequest::DeleteUser { username, delete_home }
            }
            AdminCommand::RemoveFromWorktreeGroup { username, group } => {
                AdminRequest::RemoveFromWorktreeGroup { username, group }
            }
            AdminCommand::RemoveSymlink { username, worktree_name, home_base } => {
                AdminRequest::RemoveSymlink { username, worktree_name, home_base }
            }
            AdminCommand::SyncUserSymlinks { username, home_base } => {
                AdminRequest::SyncUserSymlinks { username, home_base }
            }
        }
    }
}

pub async fn run(args: AdminArgs) -> anyhow::Result<()> {
    let ctx = AdminCtx::new(args.dry_run, args.verbose);
    ctx.run(args.command.into_request()).await?;
    Ok(())
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;

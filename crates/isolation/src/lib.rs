// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agor-isolation: Unix users, per-worktree groups, and home-directory
//! symlinks.
//!
//! Every operation is built over a [`CommandRunner`](agor_shell::CommandRunner)
//! so the daemon can inject sudo routing, dry-run, or a recording fake.
//! Mutations probe pre-state with `check` first and are idempotent:
//! "already exists" and "already gone" are both success.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod admin;
mod error;
mod groups;
mod names;
mod symlinks;
mod users;

pub use admin::{AdminCtx, AdminRequest};
pub use error::IsolationError;
pub use groups::{
    add_user_to_group, create_group, delete_group, is_user_in_group, remove_user_from_group,
};
pub use names::{
    validate_unix_username, worktree_group_name, worktree_symlink_path, worktrees_dir,
    GROUP_PREFIX,
};
pub use symlinks::{
    create_symlink, find_broken_symlinks, remove_broken_symlinks, remove_symlink,
    setup_worktrees_dir, sync_user_symlinks,
};
pub use users::{delete_user, ensure_user, user_exists};

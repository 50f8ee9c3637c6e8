// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worktree Unix group management.

use agor_shell::{Cmd, CommandRunner};
use tracing::info;

use crate::error::IsolationError;
use crate::names::{validate_unix_username, GROUP_PREFIX};

fn validate_group(group: &str) -> Result<(), IsolationError> {
    // Only touch groups in our own namespace; refuse to mutate system groups.
    let tag = group.strip_prefix(GROUP_PREFIX).unwrap_or("");
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(IsolationError::InvalidGroup { name: group.to_string() });
    }
    Ok(())
}

async fn group_exists(runner: &dyn CommandRunner, group: &str) -> bool {
    runner.check(&Cmd::new("getent").args(["group", group])).await
}

/// Create the group if absent.
pub async fn create_group(
    runner: &dyn CommandRunner,
    group: &str,
) -> Result<(), IsolationError> {
    validate_group(group)?;
    if group_exists(runner, group).await {
        info!(group, "group already exists");
        return Ok(());
    }
    runner.exec_all(&[Cmd::new("groupadd").arg(group)]).await?;
    info!(group, "created group");
    Ok(())
}

/// Delete the group if present.
pub async fn delete_group(
    runner: &dyn CommandRunner,
    group: &str,
) -> Result<(), IsolationError> {
    validate_group(group)?;
    if !group_exists(runner, group).await {
        info!(group, "group already absent");
        return Ok(());
    }
    runner.exec_all(&[Cmd::new("groupdel").arg(group)]).await?;
    info!(group, "deleted group");
    Ok(())
}

/// Add the user to the group (supplementary membership).
///
/// The membership only becomes visible to already-running sessions via a
/// login-shell escalation; see
/// [`ImpersonationMode::LoginShell`](agor_shell::ImpersonationMode).
pub async fn add_user_to_group(
    runner: &dyn CommandRunner,
    username: &str,
    group: &str,
) -> Result<(), IsolationError> {
    validate_unix_username(username)?;
    validate_group(group)?;
    if is_user_in_group(runner, username, group).await {
        info!(username, group, "already a member");
        return Ok(());
    }
    runner
        .exec_all(&[Cmd::new("usermod").args(["--append", "--groups", group, username])])
        .await?;
    info!(username, group, "added to group");
    Ok(())
}

/// Remove the user from the group.
pub async fn remove_user_from_group(
    runner: &dyn CommandRunner,
    username: &str,
    group: &str,
) -> Result<(), IsolationError> {
    validate_unix_username(username)?;
    validate_group(group)?;
    if !is_user_in_group(runner, username, group).await {
        info!(username, group, "not a member");
        return Ok(());
    }
    runner.exec_all(&[Cmd::new("gpasswd").args(["--delete", username, group])]).await?;
    info!(username, group, "removed from group");
    Ok(())
}

/// Whether the user currently belongs to the group per `/etc/group`.
pub async fn is_user_in_group(
    runner: &dyn CommandRunner,
    username: &str,
    group: &str,
) -> bool {
    let result = match runner.exec(&Cmd::new("id").args(["-nG", username])).await {
        Ok(r) if r.success() => r,
        _ => return false,
    };
    result.stdout.split_whitespace().any(|g| g == group)
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;

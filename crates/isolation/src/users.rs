// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix user management.

use std::path::Path;

use agor_shell::{Cmd, CommandRunner};
use tracing::info;

use crate::error::IsolationError;
use crate::names::validate_unix_username;

/// Probe whether a user exists.
pub async fn user_exists(runner: &dyn CommandRunner, username: &str) -> bool {
    runner.check(&Cmd::new("id").arg("-u").arg(username)).await
}

/// Create the user with a home directory if it does not already exist.
///
/// Idempotent: calling twice performs the mutation at most once.
pub async fn ensure_user(
    runner: &dyn CommandRunner,
    username: &str,
    home_base: &Path,
) -> Result<(), IsolationError> {
    validate_unix_username(username)?;
    if user_exists(runner, username).await {
        info!(username, "user already exists");
        return Ok(());
    }

    let home = home_base.join(username);
    runner
        .exec_all(&[Cmd::new("useradd")
            .arg("--create-home")
            .arg("--home-dir")
            .arg(home.display().to_string())
            .arg("--shell")
            .arg("/bin/bash")
            .arg(username)])
        .await?;
    info!(username, home = %home.display(), "created user");
    Ok(())
}

/// Remove the user, optionally deleting their home directory.
///
/// A user that is already gone is success.
pub async fn delete_user(
    runner: &dyn CommandRunner,
    username: &str,
    delete_home: bool,
) -> Result<(), IsolationError> {
    validate_unix_username(username)?;
    if !user_exists(runner, username).await {
        info!(username, "user already absent");
        return Ok(());
    }

    let mut cmd = Cmd::new("userdel");
    if delete_home {
        cmd = cmd.arg("--remove");
    }
    runner.exec_all(&[cmd.arg(username)]).await?;
    info!(username, delete_home, "deleted user");
    Ok(())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;

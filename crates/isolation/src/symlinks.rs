// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Home-directory symlinks into shared worktrees.
//!
//! Discovery (which links exist, which are broken) reads the filesystem
//! directly; mutation goes through the runner so dry-run and sudo routing
//! apply. `<home>/agor/worktrees/<slug>` → the worktree checkout owned by
//! the cloning user.

use std::path::{Path, PathBuf};

use agor_shell::{Cmd, CommandRunner};
use tracing::{debug, info};

use crate::error::IsolationError;
use crate::names::{validate_unix_username, worktree_symlink_path, worktrees_dir};

/// Create (or repoint) the symlink for a worktree in the user's home.
pub async fn create_symlink(
    runner: &dyn CommandRunner,
    home_base: &Path,
    username: &str,
    slug: &str,
    target: &Path,
) -> Result<PathBuf, IsolationError> {
    validate_unix_username(username)?;
    let link = worktree_symlink_path(home_base, username, slug);
    runner
        .exec_all(&[
            Cmd::new("mkdir").arg("-p").arg(worktrees_dir(home_base, username).display().to_string()),
            Cmd::new("ln").args([
                "-sfn".to_string(),
                target.display().to_string(),
                link.display().to_string(),
            ]),
        ])
        .await?;
    info!(username, slug, target = %target.display(), "created worktree symlink");
    Ok(link)
}

/// Remove the symlink for a worktree from the user's home, if present.
pub async fn remove_symlink(
    runner: &dyn CommandRunner,
    home_base: &Path,
    username: &str,
    slug: &str,
) -> Result<(), IsolationError> {
    validate_unix_username(username)?;
    let link = worktree_symlink_path(home_base, username, slug);
    if link.symlink_metadata().is_err() {
        debug!(link = %link.display(), "symlink already absent");
        return Ok(());
    }
    runner.exec_all(&[Cmd::new("rm").arg(link.display().to_string())]).await?;
    info!(username, slug, "removed worktree symlink");
    Ok(())
}

/// Symlinks in `dir` whose targets no longer exist.
pub fn find_broken_symlinks(dir: &Path) -> Result<Vec<PathBuf>, IsolationError> {
    let mut broken = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        // A missing directory has no broken links to clean
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(broken),
        Err(source) => return Err(IsolationError::Io { path: dir.to_path_buf(), source }),
    };

    for entry in entries {
        let entry =
            entry.map_err(|source| IsolationError::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        let Ok(meta) = path.symlink_metadata() else { continue };
        if meta.file_type().is_symlink() && !path.exists() {
            broken.push(path);
        }
    }
    Ok(broken)
}

/// Delete every broken symlink in `dir`. Returns the removed paths.
pub async fn remove_broken_symlinks(
    runner: &dyn CommandRunner,
    dir: &Path,
) -> Result<Vec<PathBuf>, IsolationError> {
    let broken = find_broken_symlinks(dir)?;
    for link in &broken {
        runner.exec_all(&[Cmd::new("rm").arg(link.display().to_string())]).await?;
        info!(link = %link.display(), "removed broken symlink");
    }
    Ok(broken)
}

/// Ensure `<home_base>/<username>/agor/worktrees` exists and is owned by
/// the user.
pub async fn setup_worktrees_dir(
    runner: &dyn CommandRunner,
    home_base: &Path,
    username: &str,
) -> Result<PathBuf, IsolationError> {
    validate_unix_username(username)?;
    let dir = worktrees_dir(home_base, username);
    runner
        .exec_all(&[
            Cmd::new("mkdir").arg("-p").arg(dir.display().to_string()),
            Cmd::new("chown")
                .arg("-R")
                .arg(format!("{username}:{username}"))
                .arg(home_base.join(username).join("agor").display().to_string()),
        ])
        .await?;
    Ok(dir)
}

/// Garbage-collect broken symlinks in the user's worktrees directory.
///
/// Called after worktree removal: links whose checkout is gone disappear,
/// live links are untouched.
pub async fn sync_user_symlinks(
    runner: &dyn CommandRunner,
    home_base: &Path,
    username: &str,
) -> Result<Vec<PathBuf>, IsolationError> {
    validate_unix_username(username)?;
    let dir = worktrees_dir(home_base, username);
    remove_broken_symlinks(runner, &dir).await
}

#[cfg(test)]
#[path = "symlinks_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name derivation and validation.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::IsolationError;

/// Prefix of every per-worktree Unix group.
pub const GROUP_PREFIX: &str = "agor_wt_";

/// Maximum length accepted for a Unix username (matches useradd's limit).
const USERNAME_MAX_LEN: usize = 32;

fn username_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    // Lowercase letters, digits, underscore; must not start with a digit.
    PATTERN.get_or_init(|| match regex::Regex::new(r"^[a-z_][a-z0-9_]*$") {
        Ok(pattern) => pattern,
        Err(_) => unreachable!("static username pattern is valid"),
    })
}

/// Validate a Unix username against the strict grammar.
///
/// Anything that reaches `useradd`/`su` interpolated into a command line
/// must have passed this first.
pub fn validate_unix_username(name: &str) -> Result<(), IsolationError> {
    if name.is_empty() || name.len() > USERNAME_MAX_LEN || !username_pattern().is_match(name) {
        return Err(IsolationError::InvalidUsername { name: name.to_string() });
    }
    Ok(())
}

/// Derive the Unix group for a worktree: `agor_wt_<hex8>`.
///
/// The tag is the first 8 hex chars of a SHA-256 over the worktree id, so
/// any id shape (uuid, nanoid) yields a stable, groupadd-safe name.
pub fn worktree_group_name(worktree_id: &str) -> String {
    let digest = Sha256::digest(worktree_id.as_bytes());
    let hex = format!("{digest:x}");
    format!("{}{}", GROUP_PREFIX, agor_core::short(&hex, 8))
}

/// `<home_base>/<username>/agor/worktrees`
pub fn worktrees_dir(home_base: &Path, username: &str) -> PathBuf {
    home_base.join(username).join("agor").join("worktrees")
}

/// `<home_base>/<username>/agor/worktrees/<slug>`
pub fn worktree_symlink_path(home_base: &Path, username: &str, slug: &str) -> PathBuf {
    worktrees_dir(home_base, username).join(slug)
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;

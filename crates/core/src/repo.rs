// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repo entity.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a cloned repository.
    pub struct RepoId("rep-");
}

/// A content-addressed clone on disk. `local_path` points at a bare clone;
/// worktrees are checked out from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: RepoId,
    pub slug: String,
    pub default_branch: String,
    pub local_path: PathBuf,
    pub created_at_ms: u64,
}

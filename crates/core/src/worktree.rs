// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree entity and the shared-access permission ladder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a checked-out worktree.
    pub struct WorktreeId("wkt-");
}

/// What non-owners of a worktree may do.
///
/// Owners always resolve to [`PermissionLevel::All`] regardless of the
/// worktree's `others_can` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    None,
    View,
    Prompt,
    All,
}

impl PermissionLevel {
    /// Numeric rank used for comparisons: none < view < prompt < all.
    pub fn rank(self) -> i8 {
        match self {
            PermissionLevel::None => -1,
            PermissionLevel::View => 0,
            PermissionLevel::Prompt => 1,
            PermissionLevel::All => 2,
        }
    }

    /// True when this level grants at least `required`.
    pub fn allows(self, required: PermissionLevel) -> bool {
        self.rank() >= required.rank()
    }
}

impl Default for PermissionLevel {
    fn default() -> Self {
        PermissionLevel::View
    }
}

crate::simple_display! {
    PermissionLevel {
        None => "none",
        View => "view",
        Prompt => "prompt",
        All => "all",
    }
}

/// A checked-out branch of a [`Repo`](crate::Repo) at a filesystem path.
///
/// When Unix isolation is on, a group `agor_wt_<shortid>` exists for every
/// non-archived worktree and gates filesystem access to `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    pub id: WorktreeId,
    pub repo_id: crate::RepoId,
    pub path: PathBuf,
    pub branch: String,
    pub others_can: PermissionLevel,
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    pub created_at_ms: u64,
}

crate::builder! {
    pub struct WorktreeBuilder => Worktree {
        into {
            branch: String = "main",
            path: PathBuf = PathBuf::from("/tmp/wt"),
        }
        set {
            others_can: PermissionLevel = PermissionLevel::View,
            archived: bool = false,
        }
        option {
            base_ref: String = None,
            git_ref: String = None,
        }
        computed {
            id: WorktreeId = WorktreeId::new(),
            repo_id: crate::RepoId = crate::RepoId::new(),
            created_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;

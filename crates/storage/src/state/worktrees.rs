// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree and ownership writers, plus visibility filtering.

use agor_core::{PermissionLevel, UserId, Worktree, WorktreeId};

use super::{MaterializedState, StorageError};

impl MaterializedState {
    pub fn insert_worktree(&mut self, worktree: Worktree) {
        self.worktree_owners.entry(worktree.id).or_default();
        self.worktrees.insert(worktree.id, worktree);
    }

    pub fn worktree(&self, id: &WorktreeId) -> Result<&Worktree, StorageError> {
        self.worktrees
            .get(id)
            .ok_or(StorageError::NotFound { entity: "worktree", id: id.to_string() })
    }

    /// Soft delete. The per-worktree group is torn down by admin tooling.
    pub fn archive_worktree(&mut self, id: &WorktreeId) -> Result<(), StorageError> {
        let worktree = self
            .worktrees
            .get_mut(id)
            .ok_or(StorageError::NotFound { entity: "worktree", id: id.to_string() })?;
        worktree.archived = true;
        Ok(())
    }

    pub fn add_owner(&mut self, worktree_id: WorktreeId, user_id: UserId) {
        self.worktree_owners.entry(worktree_id).or_default().insert(user_id);
    }

    pub fn remove_owner(&mut self, worktree_id: &WorktreeId, user_id: &UserId) {
        if let Some(owners) = self.worktree_owners.get_mut(worktree_id) {
            owners.remove(user_id);
        }
    }

    pub fn is_owner(&self, worktree_id: &WorktreeId, user_id: &UserId) -> bool {
        self.worktree_owners
            .get(worktree_id)
            .is_some_and(|owners| owners.contains(user_id))
    }

    /// Effective permission of `user` on `worktree`: owners resolve to
    /// `all` regardless of `others_can`.
    pub fn effective_permission(
        &self,
        worktree_id: &WorktreeId,
        user_id: &UserId,
    ) -> Result<PermissionLevel, StorageError> {
        let worktree = self.worktree(worktree_id)?;
        if self.is_owner(worktree_id, user_id) {
            Ok(PermissionLevel::All)
        } else {
            Ok(worktree.others_can)
        }
    }

    /// Post-query `find` filter: a worktree is visible if the caller owns
    /// it or `others_can` grants at least view.
    pub fn visible_worktrees(&self, user_id: &UserId) -> Vec<&Worktree> {
        self.worktrees
            .values()
            .filter(|wt| {
                self.is_owner(&wt.id, user_id) || wt.others_can.allows(PermissionLevel::View)
            })
            .collect()
    }
}

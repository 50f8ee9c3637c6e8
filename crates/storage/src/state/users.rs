// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User, repo, and credential writers.

use agor_core::{CredentialKey, Repo, User, UserId};

use super::{MaterializedState, StorageError};

impl MaterializedState {
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn user(&self, id: &UserId) -> Result<&User, StorageError> {
        self.users
            .get(id)
            .ok_or(StorageError::NotFound { entity: "user", id: id.to_string() })
    }

    /// Change a user's Unix identity. Existing sessions keep their stamped
    /// username; the mismatch is caught when their next task is created.
    pub fn set_unix_username(
        &mut self,
        id: &UserId,
        unix_username: Option<String>,
    ) -> Result<(), StorageError> {
        let user = self
            .users
            .get_mut(id)
            .ok_or(StorageError::NotFound { entity: "user", id: id.to_string() })?;
        user.unix_username = unix_username;
        Ok(())
    }

    pub fn insert_repo(&mut self, repo: Repo) {
        self.repos.insert(repo.id, repo);
    }

    /// Store (or replace) a user's secret for `key`.
    pub fn upsert_credential(&mut self, user_id: UserId, key: CredentialKey, value: String) {
        self.credentials.entry(user_id).or_default().insert(key, value);
    }

    /// A user's stored secret for `key`, if any. Environment fallback is
    /// the caller's concern.
    pub fn credential(&self, user_id: &UserId, key: CredentialKey) -> Option<&str> {
        self.credentials.get(user_id).and_then(|m| m.get(&key)).map(String::as_str)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User entity.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a human operator.
    pub struct UserId("usr-");
}

/// A human operator of the control plane.
///
/// `unix_username` is the Unix identity the user's executors run under.
/// It is `None` when Unix isolation is disabled; the user's home directory
/// and executor impersonation are derived from it when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub unix_username: Option<String>,
    pub created_at_ms: u64,
}

crate::builder! {
    pub struct UserBuilder => User {
        into { name: String = "test-user" }
        option { unix_username: String = None }
        computed {
            id: UserId = UserId::new(),
            created_at_ms: u64 = 0,
        }
    }
}

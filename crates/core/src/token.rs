// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session token claims.
//!
//! A token is issued by the daemon when it spawns an executor, and is the
//! sole authority the executor uses to authenticate back. Signing and
//! verification live in `agor-auth`; only the claims shape is shared here.

use serde::{Deserialize, Serialize};

/// Who a token acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRole {
    /// A human operator's access token.
    User,
    /// An executor's service token, scoped to one session.
    Service,
}

crate::simple_display! {
    TokenRole {
        User => "user",
        Service => "service",
    }
}

/// Claims carried by a short-lived bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub session_id: crate::SessionId,
    pub user_id: crate::UserId,
    pub role: TokenRole,
    pub expires_at_ms: u64,
}

impl TokenClaims {
    /// True when the token has expired as of `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

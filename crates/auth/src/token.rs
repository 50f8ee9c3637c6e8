// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signed bearer tokens.
//!
//! Token form: `<payload-hex>.<sig-hex>` where the payload is the claims
//! JSON and the signature is SHA-256 over `secret || payload-hex`.
//! Verification is stateless, so tokens survive a daemon restart as long
//! as the secret does.

use agor_core::{TokenClaims, TokenRole};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    /// Issue a token for the claims. `ttl_ms` is added to `now_ms` to set
    /// the expiry.
    pub fn issue(
        &self,
        session_id: agor_core::SessionId,
        user_id: agor_core::UserId,
        role: TokenRole,
        now_ms: u64,
        ttl_ms: u64,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            session_id,
            user_id,
            role,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        };
        let payload = serde_json::to_string(&claims)
            .map_err(|e| AuthError::InvalidInput(format!("claims encode: {e}")))?;
        let payload_hex = hex_encode(payload.as_bytes());
        let sig = self.sign(&payload_hex);
        Ok(format!("{payload_hex}.{sig}"))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str, now_ms: u64) -> Result<TokenClaims, AuthError> {
        let (payload_hex, sig) = token
            .split_once('.')
            .ok_or_else(|| AuthError::Unauthenticated("malformed token".into()))?;

        if self.sign(payload_hex) != sig {
            return Err(AuthError::Unauthenticated("bad token signature".into()));
        }

        let payload = hex_decode(payload_hex)
            .ok_or_else(|| AuthError::Unauthenticated("malformed token payload".into()))?;
        let claims: TokenClaims = serde_json::from_slice(&payload)
            .map_err(|_| AuthError::Unauthenticated("malformed token claims".into()))?;

        if claims.is_expired(now_ms) {
            return Err(AuthError::Unauthenticated("token expired".into()));
        }
        Ok(claims)
    }

    fn sign(&self, payload_hex: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(payload_hex.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agor_core::{SessionId, UserId};

fn signer() -> TokenSigner {
    TokenSigner::new(b"unit-test-secret".to_vec())
}

#[test]
fn issue_verify_round_trip() {
    let signer = signer();
    let session_id = SessionId::new();
    let user_id = UserId::new();
    let token = signer.issue(session_id, user_id, TokenRole::Service, 1_000, 60_000).unwrap();

    let claims = signer.verify(&token, 2_000).unwrap();
    assert_eq!(claims.session_id, session_id);
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.role, TokenRole::Service);
    assert_eq!(claims.expires_at_ms, 61_000);
}

#[test]
fn expired_token_rejected() {
    let signer = signer();
    let token = signer
        .issue(SessionId::new(), UserId::new(), TokenRole::User, 1_000, 500)
        .unwrap();
    let err = signer.verify(&token, 1_500).unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated(msg) if msg.contains("expired")));
}

#[test]
fn tampered_payload_rejected() {
    let signer = signer();
    let token = signer
        .issue(SessionId::new(), UserId::new(), TokenRole::User, 1_000, 60_000)
        .unwrap();
    let (payload, sig) = token.split_once('.').unwrap();
    let mut bytes: Vec<char> = payload.chars().collect();
    bytes[0] = if bytes[0] == '0' { '1' } else { '0' };
    let forged: String = bytes.into_iter().collect();

    let err = signer.verify(&format!("{forged}.{sig}"), 2_000).unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated(msg) if msg.contains("signature")));
}

#[test]
fn wrong_secret_rejected() {
    let token = signer()
        .issue(SessionId::new(), UserId::new(), TokenRole::Service, 0, 60_000)
        .unwrap();
    let other = TokenSigner::new(b"different-secret".to_vec());
    assert!(other.verify(&token, 1).is_err());
}

#[test]
fn garbage_tokens_rejected() {
    let signer = signer();
    for junk in ["", "no-dot", "zz.zz", "..", "deadbeef."] {
        assert!(signer.verify(junk, 0).is_err(), "{junk:?} must not verify");
    }
}

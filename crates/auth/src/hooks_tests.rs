// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agor_core::{Session, User, Worktree};
use serde_json::json;
use yare::parameterized;

struct Fixture {
    state: MaterializedState,
    owner: UserId,
    other: UserId,
    worktree_id: WorktreeId,
    session_id: SessionId,
}

fn fixture(others_can: PermissionLevel) -> Fixture {
    let mut state = MaterializedState::default();

    let owner = User::builder().name("owner").unix_username("owner_u").build();
    let other = User::builder().name("other").unix_username("other_u").build();
    let worktree = Worktree::builder().others_can(others_can).build();
    let session = Session::builder().unix_username("owner_u").build();
    let session = Session { worktree_id: worktree.id, created_by: owner.id, ..session };

    let ids = Fixture {
        owner: owner.id,
        other: other.id,
        worktree_id: worktree.id,
        session_id: session.id,
        state: MaterializedState::default(),
    };
    state.insert_user(owner.clone());
    state.insert_user(other);
    state.insert_worktree(worktree);
    state.insert_session(session);
    state.add_owner(ids.worktree_id, owner.id);
    Fixture { state, ..ids }
}

#[test]
fn owner_can_create_session_regardless_of_others_can() {
    let f = fixture(PermissionLevel::None);
    authorize_create_session(&f.state, f.owner, f.worktree_id).unwrap();
}

#[parameterized(
    none = { PermissionLevel::None, false },
    view = { PermissionLevel::View, false },
    prompt = { PermissionLevel::Prompt, false },
    all = { PermissionLevel::All, true },
)]
fn non_owner_session_creation_needs_all(others_can: PermissionLevel, allowed: bool) {
    let f = fixture(others_can);
    let result = authorize_create_session(&f.state, f.other, f.worktree_id);
    assert_eq!(result.is_ok(), allowed);
}

#[parameterized(
    none = { PermissionLevel::None, false },
    view = { PermissionLevel::View, false },
    prompt = { PermissionLevel::Prompt, true },
    all = { PermissionLevel::All, true },
)]
fn non_owner_task_creation_needs_prompt(others_can: PermissionLevel, allowed: bool) {
    let f = fixture(others_can);
    let result = authorize_create_task(&f.state, f.other, f.session_id);
    assert_eq!(result.is_ok(), allowed);
}

#[parameterized(
    none = { PermissionLevel::None, false },
    view = { PermissionLevel::View, true },
)]
fn non_owner_reads_need_view(others_can: PermissionLevel, allowed: bool) {
    let f = fixture(others_can);
    let result = authorize_read_session(&f.state, f.other, f.session_id);
    assert_eq!(result.is_ok(), allowed);
}

#[test]
fn patch_naming_immutable_fields_is_forbidden() {
    let f = fixture(PermissionLevel::All);
    for field in ["created_by", "unix_username"] {
        let patch = json!({ field: "x" });
        let err =
            authorize_patch_session(&f.state, f.owner, f.session_id, &patch).unwrap_err();
        match err {
            AuthError::Forbidden(msg) => assert!(msg.contains("immutable"), "{msg}"),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }
}

#[test]
fn patch_of_mutable_fields_passes() {
    let f = fixture(PermissionLevel::All);
    let patch = json!({ "archived": true });
    authorize_patch_session(&f.state, f.owner, f.session_id, &patch).unwrap();
}

#[test]
fn task_creation_rejected_when_creator_unix_username_changed() {
    let mut f = fixture(PermissionLevel::All);
    // The creator's Unix identity moved after the session was stamped
    f.state.set_unix_username(&f.owner, Some("renamed".into())).unwrap();

    let err = authorize_create_task(&f.state, f.owner, f.session_id).unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(msg) if msg.contains("unix_username")));
}

#[test]
fn message_creation_recovers_session_from_task() {
    let mut f = fixture(PermissionLevel::All);
    {
        let state = &mut f.state;
        state
            .patch_session(
                &f.session_id,
                agor_storage::SessionPatch::status(agor_core::SessionStatus::Running),
            )
            .unwrap();
    }
    let task_id = f.state.create_task(f.session_id, "prompt", 0).unwrap().id;
    authorize_create_message(&f.state, f.owner, task_id).unwrap();
}

#[test]
fn missing_session_is_not_found() {
    let f = fixture(PermissionLevel::All);
    let err = authorize_read_session(&f.state, f.owner, SessionId::new()).unwrap_err();
    assert!(matches!(err, AuthError::NotFound { entity: "session", .. }));
}

#[test]
fn chain_caches_are_populated_in_order() {
    let f = fixture(PermissionLevel::View);
    let mut ctx = AuthContext::new(&f.state, f.other, PermissionLevel::View);
    ctx.session_id = Some(f.session_id);

    let ctx = run_chain(ctx, &[resolve_session_context, load_session, load_worktree]).unwrap();
    assert!(ctx.session.is_some());
    assert!(ctx.worktree.is_some());
    assert_eq!(ctx.is_owner, Some(false));
}

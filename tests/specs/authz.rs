// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization specs: immutability, rank monotonicity, visibility.

use agor_auth::AuthError;
use agor_core::{PermissionLevel, Session, User, Worktree};
use agor_storage::MaterializedState;
use serde_json::json;

struct World {
    state: MaterializedState,
    owner: agor_core::UserId,
    viewer: agor_core::UserId,
    session_id: agor_core::SessionId,
    worktree_id: agor_core::WorktreeId,
}

fn world(others_can: PermissionLevel) -> World {
    let mut state = MaterializedState::default();
    let owner = User::builder().name("owner").unix_username("owner_u").build();
    let viewer = User::builder().name("viewer").unix_username("viewer_u").build();
    let worktree = Worktree::builder().others_can(others_can).build();
    let session = Session::builder().unix_username("owner_u").build();
    let session = Session { worktree_id: worktree.id, created_by: owner.id, ..session };

    let ids = World {
        owner: owner.id,
        viewer: viewer.id,
        session_id: session.id,
        worktree_id: worktree.id,
        state: MaterializedState::default(),
    };
    state.insert_user(owner);
    state.insert_user(viewer);
    state.insert_worktree(worktree);
    state.insert_session(session);
    state.add_owner(ids.worktree_id, ids.owner);
    World { state, ..ids }
}

#[test]
fn patching_the_execution_identity_is_forbidden() {
    let w = world(PermissionLevel::All);
    let patch = json!({"unix_username": "mallory"});
    let err =
        agor_auth::authorize_patch_session(&w.state, w.owner, w.session_id, &patch).unwrap_err();
    match err {
        AuthError::Forbidden(msg) => assert!(msg.contains("immutable"), "{msg}"),
        other => panic!("expected Forbidden, got {other:?}"),
    }

    let patch = json!({"created_by": "usr-mallory"});
    let err =
        agor_auth::authorize_patch_session(&w.state, w.owner, w.session_id, &patch).unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(_)));
}

#[test]
fn permission_ranks_are_monotone() {
    // A user who can prompt can also view; all grants both
    let w = world(PermissionLevel::Prompt);
    agor_auth::authorize_read_session(&w.state, w.viewer, w.session_id).unwrap();
    agor_auth::authorize_create_task(&w.state, w.viewer, w.session_id).unwrap();
    assert!(agor_auth::authorize_create_session(&w.state, w.viewer, w.worktree_id).is_err());

    let w = world(PermissionLevel::All);
    agor_auth::authorize_read_session(&w.state, w.viewer, w.session_id).unwrap();
    agor_auth::authorize_create_task(&w.state, w.viewer, w.session_id).unwrap();
    agor_auth::authorize_create_session(&w.state, w.viewer, w.worktree_id).unwrap();
}

#[test]
fn find_filters_by_ownership_or_view() {
    let mut state = MaterializedState::default();
    let user = User::builder().build();
    let owned = Worktree::builder().others_can(PermissionLevel::None).build();
    let shared = Worktree::builder().others_can(PermissionLevel::Prompt).build();
    let hidden = Worktree::builder().others_can(PermissionLevel::None).build();
    let ids = (user.id, owned.id, shared.id, hidden.id);
    state.insert_user(user);
    state.insert_worktree(owned);
    state.insert_worktree(shared);
    state.insert_worktree(hidden);
    state.add_owner(ids.1, ids.0);

    let visible: Vec<_> = state.visible_worktrees(&ids.0).iter().map(|w| w.id).collect();
    assert!(visible.contains(&ids.1));
    assert!(visible.contains(&ids.2));
    assert!(!visible.contains(&ids.3));
}

#[test]
fn shell_quoting_survives_a_real_shell() {
    for hostile in ["don't", "$HOME", "a && b", "", "`id`"] {
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf %s {}", agor_shell::escape_shell_arg(hostile)))
            .output()
            .unwrap();
        assert_eq!(String::from_utf8(output.stdout).unwrap(), hostile);
    }
}

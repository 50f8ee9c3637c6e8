// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    none = { PermissionLevel::None, -1 },
    view = { PermissionLevel::View, 0 },
    prompt = { PermissionLevel::Prompt, 1 },
    all = { PermissionLevel::All, 2 },
)]
fn ranks(level: PermissionLevel, expected: i8) {
    assert_eq!(level.rank(), expected);
}

#[test]
fn permission_is_monotone_in_rank() {
    // prompt implies view; all implies both.
    assert!(PermissionLevel::Prompt.allows(PermissionLevel::View));
    assert!(PermissionLevel::All.allows(PermissionLevel::Prompt));
    assert!(PermissionLevel::All.allows(PermissionLevel::View));
    assert!(!PermissionLevel::View.allows(PermissionLevel::Prompt));
    assert!(!PermissionLevel::None.allows(PermissionLevel::View));
}

#[test]
fn default_level_is_view() {
    assert_eq!(PermissionLevel::default(), PermissionLevel::View);
}

#[test]
fn level_serializes_snake_case() {
    let json = serde_json::to_string(&PermissionLevel::Prompt).unwrap();
    assert_eq!(json, "\"prompt\"");
}

#[test]
fn builder_defaults() {
    let wt = Worktree::builder().build();
    assert_eq!(wt.others_can, PermissionLevel::View);
    assert!(!wt.archived);
    assert!(wt.id.as_str().starts_with("wkt-"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agor_shell::{DirectRunner, RecordingRunner};

#[tokio::test]
async fn create_symlink_builds_mkdir_and_ln() {
    let runner = RecordingRunner::new();
    let link = create_symlink(
        &runner,
        Path::new("/home"),
        "alice",
        "fix-auth",
        Path::new("/srv/agor/worktrees/fix-auth"),
    )
    .await
    .unwrap();

    assert_eq!(link, PathBuf::from("/home/alice/agor/worktrees/fix-auth"));
    let lines = runner.executed_lines();
    assert_eq!(lines[0], "mkdir -p /home/alice/agor/worktrees");
    assert_eq!(
        lines[1],
        "ln -sfn /srv/agor/worktrees/fix-auth /home/alice/agor/worktrees/fix-auth"
    );
}

#[tokio::test]
async fn remove_symlink_absent_is_success() {
    let runner = RecordingRunner::new();
    let dir = tempfile::tempdir().unwrap();
    remove_symlink(&runner, dir.path(), "alice", "gone").await.unwrap();
    assert!(runner.executed_lines().is_empty());
}

#[tokio::test]
async fn remove_symlink_present_runs_rm() {
    let runner = RecordingRunner::new();
    let home_base = tempfile::tempdir().unwrap();
    let wt_dir = worktrees_dir(home_base.path(), "alice");
    std::fs::create_dir_all(&wt_dir).unwrap();
    let link = wt_dir.join("fix-auth");
    std::os::unix::fs::symlink("/nonexistent-target", &link).unwrap();

    remove_symlink(&runner, home_base.path(), "alice", "fix-auth").await.unwrap();
    assert_eq!(runner.executed_lines(), vec![format!("rm {}", link.display())]);
}

#[tokio::test]
async fn broken_symlinks_are_found_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("real-target");
    std::fs::write(&target, "content").unwrap();

    let live = dir.path().join("live");
    std::os::unix::fs::symlink(&target, &live).unwrap();
    let broken = dir.path().join("broken");
    std::os::unix::fs::symlink(dir.path().join("missing"), &broken).unwrap();
    let regular = dir.path().join("regular");
    std::fs::write(&regular, "not a link").unwrap();

    let found = find_broken_symlinks(dir.path()).unwrap();
    assert_eq!(found, vec![broken.clone()]);

    // DirectRunner so rm actually runs
    let removed = remove_broken_symlinks(&DirectRunner, dir.path()).await.unwrap();
    assert_eq!(removed, vec![broken.clone()]);
    assert!(broken.symlink_metadata().is_err());
    assert!(live.symlink_metadata().is_ok());
    assert!(regular.exists());
}

#[tokio::test]
async fn find_broken_in_missing_dir_is_empty() {
    let found = find_broken_symlinks(Path::new("/nonexistent/agor/worktrees")).unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn setup_worktrees_dir_creates_and_chowns() {
    let runner = RecordingRunner::new();
    let dir = setup_worktrees_dir(&runner, Path::new("/home"), "alice").await.unwrap();
    assert_eq!(dir, PathBuf::from("/home/alice/agor/worktrees"));
    let lines = runner.executed_lines();
    assert_eq!(lines[0], "mkdir -p /home/alice/agor/worktrees");
    assert_eq!(lines[1], "chown -R alice:alice /home/alice/agor");
}

#[tokio::test]
async fn sync_removes_only_broken_links() {
    let home_base = tempfile::tempdir().unwrap();
    let wt_dir = worktrees_dir(home_base.path(), "alice");
    std::fs::create_dir_all(&wt_dir).unwrap();

    let target = home_base.path().join("checkout");
    std::fs::create_dir(&target).unwrap();
    std::os::unix::fs::symlink(&target, wt_dir.join("live")).unwrap();
    std::os::unix::fs::symlink("/gone", wt_dir.join("stale")).unwrap();

    let removed = sync_user_symlinks(&DirectRunner, home_base.path(), "alice").await.unwrap();
    assert_eq!(removed, vec![wt_dir.join("stale")]);
    assert!(wt_dir.join("live").symlink_metadata().is_ok());
}

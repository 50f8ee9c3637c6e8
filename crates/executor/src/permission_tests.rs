// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

fn ids() -> (SessionId, TaskId) {
    (SessionId::new(), TaskId::new())
}

#[tokio::test]
async fn resolve_allows_waiter() {
    let manager = Arc::new(PermissionManager::new());
    let (session_id, task_id) = ids();

    let waiter = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager.wait_for_decision("req-1", session_id, task_id, Duration::from_secs(5)).await
        }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(manager.resolve("req-1", true, None));
    let decision = waiter.await.unwrap();
    assert!(decision.allow);
    assert_eq!(manager.pending_count(), 0);
}

#[tokio::test]
async fn timeout_denies_with_reason() {
    let manager = PermissionManager::new();
    let (session_id, task_id) = ids();
    let decision = manager
        .wait_for_decision("req-t", session_id, task_id, Duration::from_millis(30))
        .await;
    assert!(!decision.allow);
    assert_eq!(decision.reason.as_deref(), Some("Timeout"));
    assert_eq!(manager.pending_count(), 0);
}

#[tokio::test]
async fn cancel_task_denies_all_its_requests() {
    let manager = Arc::new(PermissionManager::new());
    let (session_id, task_id) = ids();
    let other_task = TaskId::new();

    let cancelled = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager.wait_for_decision("req-a", session_id, task_id, Duration::from_secs(5)).await
        }
    });
    let survivor = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager
                .wait_for_decision("req-b", session_id, other_task, Duration::from_millis(200))
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    manager.cancel_task(&task_id);

    let decision = cancelled.await.unwrap();
    assert_eq!(decision.reason.as_deref(), Some("Cancelled"));
    // The other task's request is untouched until its own timeout
    let other = survivor.await.unwrap();
    assert_eq!(other.reason.as_deref(), Some("Timeout"));
}

#[tokio::test]
async fn first_deny_cancels_session_siblings() {
    let manager = Arc::new(PermissionManager::new());
    let session_id = SessionId::new();
    let task_id = TaskId::new();
    let other_session = SessionId::new();

    let denied = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager.wait_for_decision("req-1", session_id, task_id, Duration::from_secs(5)).await
        }
    });
    let sibling = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager.wait_for_decision("req-2", session_id, task_id, Duration::from_secs(5)).await
        }
    });
    let unrelated = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager
                .wait_for_decision("req-3", other_session, TaskId::new(), Duration::from_millis(200))
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    manager.resolve("req-1", false, Some("user said no".into()));

    let first = denied.await.unwrap();
    assert!(!first.allow);
    assert_eq!(first.reason.as_deref(), Some("user said no"));

    let second = sibling.await.unwrap();
    assert_eq!(second.reason.as_deref(), Some("Cancelled"));

    // Other sessions are unaffected
    let third = unrelated.await.unwrap();
    assert_eq!(third.reason.as_deref(), Some("Timeout"));
}

#[tokio::test]
async fn resolving_unknown_request_reports_false() {
    let manager = PermissionManager::new();
    assert!(!manager.resolve("missing", true, None));
}

#[tokio::test]
async fn allow_does_not_cancel_siblings() {
    let manager = Arc::new(PermissionManager::new());
    let session_id = SessionId::new();
    let task_id = TaskId::new();

    let approved = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager.wait_for_decision("req-1", session_id, task_id, Duration::from_secs(5)).await
        }
    });
    let sibling = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            manager.wait_for_decision("req-2", session_id, task_id, Duration::from_secs(5)).await
        }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    manager.resolve("req-1", true, None);
    assert!(approved.await.unwrap().allow);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(manager.pending_count(), 1);
    manager.resolve("req-2", true, None);
    assert!(sibling.await.unwrap().allow);
}

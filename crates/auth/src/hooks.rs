// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authorization hook chain.
//!
//! Hooks are pure functions `(AuthContext) -> Result<AuthContext, AuthError>`
//! run in order. Earlier hooks populate caches (`session`, `worktree`,
//! `is_owner`) that later hooks read, so each record is fetched once.
//!
//! Required ranks: creating a session needs `all` on the worktree,
//! creating tasks or messages needs `prompt`, reads need `view`.

use agor_core::{PermissionLevel, Session, SessionId, TaskId, UserId, Worktree, WorktreeId};
use agor_storage::MaterializedState;

use crate::error::AuthError;

/// Everything a hook may inspect, with caches filled as the chain runs.
pub struct AuthContext<'a> {
    pub state: &'a MaterializedState,
    pub user_id: UserId,
    pub required: PermissionLevel,

    /// Session id from the request body/path, when present.
    pub session_id: Option<SessionId>,
    /// Task id, for operations addressed by task (message creation).
    pub task_id: Option<TaskId>,
    /// Worktree id, for operations addressed by worktree (session creation).
    pub worktree_id: Option<WorktreeId>,
    /// Patch body for patch operations.
    pub patch: Option<&'a serde_json::Value>,

    // Caches
    pub session: Option<&'a Session>,
    pub worktree: Option<&'a Worktree>,
    pub is_owner: Option<bool>,
}

impl<'a> AuthContext<'a> {
    pub fn new(state: &'a MaterializedState, user_id: UserId, required: PermissionLevel) -> Self {
        Self {
            state,
            user_id,
            required,
            session_id: None,
            task_id: None,
            worktree_id: None,
            patch: None,
            session: None,
            worktree: None,
            is_owner: None,
        }
    }
}

/// One step of the chain.
pub type Hook = for<'a> fn(AuthContext<'a>) -> Result<AuthContext<'a>, AuthError>;

/// Run hooks in order, threading the context through.
pub fn run_chain<'a>(
    mut ctx: AuthContext<'a>,
    hooks: &[Hook],
) -> Result<AuthContext<'a>, AuthError> {
    for hook in hooks {
        ctx = hook(ctx)?;
    }
    Ok(ctx)
}

/// Recover the session id for operations that omit it (message creation
/// addresses a task): load the existing record once.
pub fn resolve_session_context(mut ctx: AuthContext<'_>) -> Result<AuthContext<'_>, AuthError> {
    if ctx.session_id.is_some() {
        return Ok(ctx);
    }
    let Some(task_id) = ctx.task_id else {
        return Err(AuthError::InvalidInput("no session context in request".into()));
    };
    let task = ctx
        .state
        .task(&task_id)
        .map_err(|_| AuthError::NotFound { entity: "task", id: task_id.to_string() })?;
    ctx.session_id = Some(task.session_id);
    Ok(ctx)
}

/// Fetch the session into the cache.
pub fn load_session(mut ctx: AuthContext<'_>) -> Result<AuthContext<'_>, AuthError> {
    let Some(session_id) = ctx.session_id else {
        return Err(AuthError::InvalidInput("no session id resolved".into()));
    };
    let session = ctx
        .state
        .session(&session_id)
        .map_err(|_| AuthError::NotFound { entity: "session", id: session_id.to_string() })?;
    ctx.session = Some(session);
    ctx.worktree_id = Some(session.worktree_id);
    Ok(ctx)
}

/// Fetch the worktree (from the cached session, or directly by id) and the
/// ownership bit.
pub fn load_worktree(mut ctx: AuthContext<'_>) -> Result<AuthContext<'_>, AuthError> {
    let Some(worktree_id) = ctx.worktree_id else {
        return Err(AuthError::InvalidInput("no worktree id resolved".into()));
    };
    let worktree = ctx
        .state
        .worktree(&worktree_id)
        .map_err(|_| AuthError::NotFound { entity: "worktree", id: worktree_id.to_string() })?;
    ctx.worktree = Some(worktree);
    ctx.is_owner = Some(ctx.state.is_owner(&worktree_id, &ctx.user_id));
    Ok(ctx)
}

/// Compare the caller's effective level against `ctx.required`.
pub fn check_permission(ctx: AuthContext<'_>) -> Result<AuthContext<'_>, AuthError> {
    let Some(worktree) = ctx.worktree else {
        return Err(AuthError::InvalidInput("permission check before worktree load".into()));
    };
    let effective = if ctx.is_owner == Some(true) {
        PermissionLevel::All
    } else {
        worktree.others_can
    };
    if !effective.allows(ctx.required) {
        return Err(AuthError::Forbidden(format!(
            "requires {} on worktree {}, caller has {}",
            ctx.required, worktree.id, effective
        )));
    }
    Ok(ctx)
}

/// A session's execution identity is immutable: reject any patch that
/// names `created_by` or `unix_username`.
pub fn ensure_session_immutability(ctx: AuthContext<'_>) -> Result<AuthContext<'_>, AuthError> {
    let Some(patch) = ctx.patch else { return Ok(ctx) };
    for field in ["created_by", "unix_username"] {
        if patch.get(field).is_some() {
            return Err(AuthError::Forbidden(format!("session field {field} is immutable")));
        }
    }
    Ok(ctx)
}

/// Before creating a task or message, re-read the creator's current Unix
/// identity and refuse on mismatch with the session's stamped value.
/// Agent SDK state lives in the creator's home; running as a different
/// user would corrupt or leak it.
pub fn validate_session_unix_username(
    ctx: AuthContext<'_>,
) -> Result<AuthContext<'_>, AuthError> {
    let Some(session) = ctx.session else {
        return Err(AuthError::InvalidInput("unix username check before session load".into()));
    };
    let creator = ctx
        .state
        .user(&session.created_by)
        .map_err(|_| AuthError::NotFound {
            entity: "user",
            id: session.created_by.to_string(),
        })?;
    if creator.unix_username != session.unix_username {
        return Err(AuthError::Forbidden(format!(
            "session unix_username {:?} no longer matches creator's {:?}",
            session.unix_username, creator.unix_username
        )));
    }
    Ok(ctx)
}

const PATCH_CHAIN: &[Hook] = &[
    resolve_session_context,
    load_session,
    load_worktree,
    check_permission,
    ensure_session_immutability,
];

const WRITE_CHAIN: &[Hook] = &[
    resolve_session_context,
    load_session,
    load_worktree,
    check_permission,
    validate_session_unix_username,
];

const READ_CHAIN: &[Hook] =
    &[resolve_session_context, load_session, load_worktree, check_permission];

/// Creating a session requires `all` on the target worktree.
pub fn authorize_create_session(
    state: &MaterializedState,
    user_id: UserId,
    worktree_id: WorktreeId,
) -> Result<(), AuthError> {
    let mut ctx = AuthContext::new(state, user_id, PermissionLevel::All);
    ctx.worktree_id = Some(worktree_id);
    run_chain(ctx, &[load_worktree, check_permission]).map(|_| ())
}

/// Patching a session requires `prompt` and must not touch immutable
/// fields.
pub fn authorize_patch_session(
    state: &MaterializedState,
    user_id: UserId,
    session_id: SessionId,
    patch: &serde_json::Value,
) -> Result<(), AuthError> {
    let mut ctx = AuthContext::new(state, user_id, PermissionLevel::Prompt);
    ctx.session_id = Some(session_id);
    ctx.patch = Some(patch);
    run_chain(ctx, PATCH_CHAIN).map(|_| ())
}

/// Creating a task requires `prompt` and a matching Unix identity.
pub fn authorize_create_task(
    state: &MaterializedState,
    user_id: UserId,
    session_id: SessionId,
) -> Result<(), AuthError> {
    let mut ctx = AuthContext::new(state, user_id, PermissionLevel::Prompt);
    ctx.session_id = Some(session_id);
    run_chain(ctx, WRITE_CHAIN).map(|_| ())
}

/// Creating a message is addressed by task; the session id is recovered
/// from the task record.
pub fn authorize_create_message(
    state: &MaterializedState,
    user_id: UserId,
    task_id: TaskId,
) -> Result<(), AuthError> {
    let mut ctx = AuthContext::new(state, user_id, PermissionLevel::Prompt);
    ctx.task_id = Some(task_id);
    run_chain(ctx, WRITE_CHAIN).map(|_| ())
}

/// Reads require `view`.
pub fn authorize_read_session(
    state: &MaterializedState,
    user_id: UserId,
    session_id: SessionId,
) -> Result<(), AuthError> {
    let mut ctx = AuthContext::new(state, user_id, PermissionLevel::View);
    ctx.session_id = Some(session_id);
    run_chain(ctx, READ_CHAIN).map(|_| ())
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn argv construction for running a command as another Unix user.
//!
//! Two escalation forms exist because Unix group caches are tied to the
//! caller's session: `sudo -u` preserves the daemon's stale group set,
//! while `su -` starts a login session that re-reads `/etc/group`. When a
//! user was just added to a worktree group, only the login-shell form sees
//! the new membership. Login shells strip the environment, so variables
//! are prepended with `env VAR='…'` inside the `-c` string.

use crate::escape::escape_shell_arg;

/// How to run a command relative to the current Unix identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpersonationMode {
    /// Run as the current identity; argv passes through byte-for-byte.
    None,
    /// `sudo -n -u <user> …` — fast path when fresh groups are not needed.
    Sudo { user: String },
    /// `sudo -n su - <user> -c "env … <cmd> …"` — forces fresh group
    /// memberships.
    LoginShell { user: String, env: Vec<(String, String)> },
}

/// Build the final `(program, args)` for `cmd args…` under `mode`.
pub fn build_spawn_args(
    cmd: &str,
    args: &[String],
    mode: &ImpersonationMode,
) -> (String, Vec<String>) {
    match mode {
        ImpersonationMode::None => (cmd.to_string(), args.to_vec()),

        ImpersonationMode::Sudo { user } => {
            let mut sudo_args = vec!["-n".to_string(), "-u".to_string(), user.clone()];
            sudo_args.push(cmd.to_string());
            sudo_args.extend(args.iter().cloned());
            ("sudo".to_string(), sudo_args)
        }

        ImpersonationMode::LoginShell { user, env } => {
            let mut inner = String::new();
            if !env.is_empty() {
                inner.push_str("env ");
                for (key, value) in env {
                    inner.push_str(key);
                    inner.push('=');
                    inner.push_str(&escape_shell_arg(value));
                    inner.push(' ');
                }
            }
            inner.push_str(&escape_shell_arg(cmd));
            for arg in args {
                inner.push(' ');
                inner.push_str(&escape_shell_arg(arg));
            }

            (
                "sudo".to_string(),
                vec![
                    "-n".to_string(),
                    "su".to_string(),
                    "-".to_string(),
                    user.clone(),
                    "-c".to_string(),
                    inner,
                ],
            )
        }
    }
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;

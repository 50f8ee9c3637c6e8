// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor argv: two startup modes.
//!
//! IPC mode (`--socket`): the executor owns a Unix socket and accepts
//! exactly one connection from the daemon, which then drives it with an
//! `execute_prompt` request.
//!
//! Feathers mode (token + ids + prompt): the executor connects out to the
//! daemon's RPC socket and runs the task it was given on the command line.

use std::path::PathBuf;

use agor_core::AgenticTool;
use clap::Parser;

use crate::error::ExecutorError;

#[derive(Debug, Parser)]
#[command(name = "agor-executor", about = "Agor task executor")]
pub struct ExecutorArgs {
    /// IPC mode: path of the Unix socket this executor will own.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Feathers mode: service token for authenticating back to the daemon.
    #[arg(long)]
    pub session_token: Option<String>,

    #[arg(long)]
    pub session_id: Option<String>,

    #[arg(long)]
    pub task_id: Option<String>,

    #[arg(long)]
    pub prompt: Option<String>,

    /// Agent tool: claude-code | codex | gemini | opencode.
    #[arg(long)]
    pub tool: Option<String>,

    #[arg(long)]
    pub permission_mode: Option<String>,

    /// Daemon RPC socket to connect back to (feathers mode).
    #[arg(long)]
    pub daemon_url: Option<PathBuf>,

    /// Working directory for the task (defaults to the current directory).
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

/// Resolved startup mode.
#[derive(Debug, Clone, PartialEq)]
pub enum StartMode {
    Ipc {
        socket: PathBuf,
    },
    Feathers {
        session_token: String,
        session_id: agor_core::SessionId,
        task_id: agor_core::TaskId,
        prompt: String,
        tool: AgenticTool,
        permission_mode: Option<String>,
        daemon_url: PathBuf,
        cwd: Option<PathBuf>,
    },
}

fn parse_tool(tool: &str) -> Result<AgenticTool, ExecutorError> {
    match tool {
        "claude-code" => Ok(AgenticTool::ClaudeCode),
        "codex" => Ok(AgenticTool::Codex),
        "gemini" => Ok(AgenticTool::Gemini),
        "opencode" => Ok(AgenticTool::OpenCode),
        other => Err(ExecutorError::BadArgs(format!("unknown tool: {other}"))),
    }
}

impl ExecutorArgs {
    /// Decide the startup mode from the flag combination.
    pub fn mode(&self) -> Result<StartMode, ExecutorError> {
        if let Some(ref socket) = self.socket {
            return Ok(StartMode::Ipc { socket: socket.clone() });
        }

        match (
            &self.session_token,
            &self.session_id,
            &self.task_id,
            &self.prompt,
            &self.tool,
            &self.daemon_url,
        ) {
            (Some(token), Some(session), Some(task), Some(prompt), Some(tool), Some(url)) => {
                Ok(StartMode::Feathers {
                    session_token: token.clone(),
                    session_id: agor_core::SessionId::from_string(session),
                    task_id: agor_core::TaskId::from_string(task),
                    prompt: prompt.clone(),
                    tool: parse_tool(tool)?,
                    permission_mode: self.permission_mode.clone(),
                    daemon_url: url.clone(),
                    cwd: self.cwd.clone(),
                })
            }
            _ => Err(ExecutorError::BadArgs(
                "need --socket (IPC mode) or --session-token/--session-id/--task-id/--prompt/--tool/--daemon-url (feathers mode)"
                    .into(),
            )),
        }
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;

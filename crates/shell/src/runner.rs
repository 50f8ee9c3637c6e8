// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `CommandRunner` trait and its four base implementations.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::command::{Cmd, ExecResult};
use crate::error::CommandError;

/// Run a shell command and report what happened.
///
/// Base runners return `Ok` with whatever exit code the process produced;
/// only [`exec_all`](CommandRunner::exec_all) and the throwing wrapper
/// promote non-zero exits to errors.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Short name for logs and dry-run output.
    fn name(&self) -> &'static str;

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError>;

    /// Run commands sequentially, stopping on the first failure.
    ///
    /// Preferred over joining commands with `&&` in a shell string: each
    /// argv stays a real argv and failures carry structured output.
    async fn exec_all(&self, cmds: &[Cmd]) -> Result<Vec<ExecResult>, CommandError> {
        let mut results = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            let result = self.exec(cmd).await?;
            if !result.success() {
                return Err(CommandError::Failed {
                    command: cmd.display_line(),
                    stdout: result.stdout,
                    stderr: result.stderr,
                    exit_code: result.exit_code,
                });
            }
            results.push(result);
        }
        Ok(results)
    }

    /// Run with `input` piped to stdin. Secrets travel this way so they
    /// never appear in argv or process listings.
    async fn exec_with_input(&self, cmd: &Cmd, input: &str) -> Result<ExecResult, CommandError>;

    /// Blocking variant for non-async call sites (CLI startup probes).
    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError>;

    /// Probe: true iff the command ran and exited zero. Never errors.
    async fn check(&self, cmd: &Cmd) -> bool {
        matches!(self.exec(cmd).await, Ok(result) if result.success())
    }
}

async fn run_tokio(cmd: &Cmd, input: Option<&str>) -> Result<ExecResult, CommandError> {
    let mut command = tokio::process::Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(ref dir) = cmd.cwd {
        command.current_dir(dir);
    }
    for (key, value) in &cmd.env {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .map_err(|source| CommandError::Spawn { command: cmd.display_line(), source })?;

    if let Some(input) = input {
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|source| CommandError::Stdin { command: cmd.display_line(), source })?;
            // Close stdin so the child sees EOF
            drop(stdin);
        }
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| CommandError::Spawn { command: cmd.display_line(), source })?;

    Ok(ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

fn run_std(cmd: &Cmd, input: Option<&str>) -> Result<ExecResult, CommandError> {
    use std::io::Write;

    let mut command = std::process::Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(ref dir) = cmd.cwd {
        command.current_dir(dir);
    }
    for (key, value) in &cmd.env {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .map_err(|source| CommandError::Spawn { command: cmd.display_line(), source })?;

    if let Some(input) = input {
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|source| CommandError::Stdin { command: cmd.display_line(), source })?;
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|source| CommandError::Spawn { command: cmd.display_line(), source })?;

    Ok(ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Execute as the current process identity.
#[derive(Debug, Clone, Default)]
pub struct DirectRunner;

#[async_trait]
impl CommandRunner for DirectRunner {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        run_tokio(cmd, None).await
    }

    async fn exec_with_input(&self, cmd: &Cmd, input: &str) -> Result<ExecResult, CommandError> {
        run_tokio(cmd, Some(input)).await
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        run_std(cmd, None)
    }
}

/// Prepend `sudo -n`. Non-interactive: a sudo prompt would block the
/// event loop, so `-n` makes a missing sudoers entry fail immediately.
#[derive(Debug, Clone, Default)]
pub struct SudoRunner;

impl SudoRunner {
    fn rewrite(cmd: &Cmd) -> Cmd {
        let mut sudo = Cmd::new("sudo").arg("-n").arg(&cmd.program).args(cmd.args.clone());
        sudo.cwd = cmd.cwd.clone();
        sudo.env = cmd.env.clone();
        sudo
    }
}

#[async_trait]
impl CommandRunner for SudoRunner {
    fn name(&self) -> &'static str {
        "sudo"
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        run_tokio(&Self::rewrite(cmd), None).await
    }

    async fn exec_with_input(&self, cmd: &Cmd, input: &str) -> Result<ExecResult, CommandError> {
        run_tokio(&Self::rewrite(cmd), Some(input)).await
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        run_std(&Self::rewrite(cmd), None)
    }
}

/// Route through the admin gateway: `sudo -n <cli> admin <cmd> <args…>`.
///
/// The sudoers policy restricts the daemon to exactly this surface, so
/// privileged operations only exist as admin subcommands.
#[derive(Debug, Clone)]
pub struct SudoCliRunner {
    cli: PathBuf,
}

impl SudoCliRunner {
    pub fn new(cli: impl Into<PathBuf>) -> Self {
        Self { cli: cli.into() }
    }

    fn rewrite(&self, cmd: &Cmd) -> Cmd {
        Cmd::new("sudo")
            .arg("-n")
            .arg(self.cli.display().to_string())
            .arg("admin")
            .arg(&cmd.program)
            .args(cmd.args.clone())
    }
}

#[async_trait]
impl CommandRunner for SudoCliRunner {
    fn name(&self) -> &'static str {
        "sudo-cli"
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        run_tokio(&self.rewrite(cmd), None).await
    }

    async fn exec_with_input(&self, _cmd: &Cmd, _input: &str) -> Result<ExecResult, CommandError> {
        // Stdin does not survive the sudo+CLI hop; secrets must not be
        // smuggled into argv instead.
        Err(CommandError::UnsupportedInput { runner: self.name() })
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        run_std(&self.rewrite(cmd), None)
    }
}

/// Log intent only; nothing runs.
#[derive(Debug, Clone, Default)]
pub struct NoOpRunner;

#[async_trait]
impl CommandRunner for NoOpRunner {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        info!(command = %cmd.display_line(), "noop: would exec");
        Ok(ExecResult::noop())
    }

    async fn exec_with_input(&self, cmd: &Cmd, _input: &str) -> Result<ExecResult, CommandError> {
        info!(command = %cmd.display_line(), "noop: would exec with stdin");
        Ok(ExecResult::noop())
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        info!(command = %cmd.display_line(), "noop: would exec (sync)");
        Ok(ExecResult::noop())
    }

    async fn check(&self, cmd: &Cmd) -> bool {
        debug!(command = %cmd.display_line(), "noop: check reports false");
        false
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

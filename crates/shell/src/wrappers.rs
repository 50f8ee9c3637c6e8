// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composable runner wrappers: logging, dry-run, throwing.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{error, info};

use crate::command::{Cmd, ExecResult};
use crate::error::CommandError;
use crate::runner::CommandRunner;

/// Log every execution with its elapsed time and exit code.
pub struct LoggingRunner<R> {
    inner: R,
}

impl<R> LoggingRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for LoggingRunner<R> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        let start = Instant::now();
        let result = self.inner.exec(cmd).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(r) => info!(
                runner = self.name(),
                command = %cmd.display_line(),
                exit_code = r.exit_code,
                elapsed_ms,
                "executed"
            ),
            Err(e) => error!(
                runner = self.name(),
                command = %cmd.display_line(),
                error = %e,
                elapsed_ms,
                "execution error"
            ),
        }
        result
    }

    async fn exec_with_input(&self, cmd: &Cmd, input: &str) -> Result<ExecResult, CommandError> {
        // Log length only, never the input itself: stdin carries secrets.
        info!(
            runner = self.name(),
            command = %cmd.display_line(),
            input_bytes = input.len(),
            "executing with stdin"
        );
        self.inner.exec_with_input(cmd, input).await
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        info!(runner = self.name(), command = %cmd.display_line(), "executing (sync)");
        self.inner.exec_sync(cmd)
    }

    async fn check(&self, cmd: &Cmd) -> bool {
        self.inner.check(cmd).await
    }
}

/// Replace side-effectful calls with logged intent, while still running
/// read-only `check` probes against the real runner so dry-run reporting
/// reflects actual pre-state.
pub struct DryRunRunner<R> {
    inner: R,
}

impl<R> DryRunRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for DryRunRunner<R> {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        info!(command = %cmd.display_line(), "dry-run: would exec");
        Ok(ExecResult::noop())
    }

    async fn exec_with_input(&self, cmd: &Cmd, _input: &str) -> Result<ExecResult, CommandError> {
        info!(command = %cmd.display_line(), "dry-run: would exec with stdin");
        Ok(ExecResult::noop())
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        info!(command = %cmd.display_line(), "dry-run: would exec (sync)");
        Ok(ExecResult::noop())
    }

    async fn check(&self, cmd: &Cmd) -> bool {
        self.inner.check(cmd).await
    }
}

/// Promote non-zero exits to [`CommandError::Failed`].
pub struct ThrowingRunner<R> {
    inner: R,
}

impl<R> ThrowingRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn promote(cmd: &Cmd, result: ExecResult) -> Result<ExecResult, CommandError> {
        if result.success() {
            Ok(result)
        } else {
            Err(CommandError::Failed {
                command: cmd.display_line(),
                stdout: result.stdout,
                stderr: result.stderr,
                exit_code: result.exit_code,
            })
        }
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for ThrowingRunner<R> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        let result = self.inner.exec(cmd).await?;
        Self::promote(cmd, result)
    }

    async fn exec_with_input(&self, cmd: &Cmd, input: &str) -> Result<ExecResult, CommandError> {
        let result = self.inner.exec_with_input(cmd, input).await?;
        Self::promote(cmd, result)
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        let result = self.inner.exec_sync(cmd)?;
        Self::promote(cmd, result)
    }

    async fn check(&self, cmd: &Cmd) -> bool {
        self.inner.check(cmd).await
    }
}

#[cfg(test)]
#[path = "wrappers_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fake for tests: captures every command, serves scripted
//! results.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::command::{Cmd, ExecResult};
use crate::error::CommandError;
use crate::runner::CommandRunner;

/// Captures executed commands and returns scripted results (success by
/// default).
#[derive(Default)]
pub struct RecordingRunner {
    executed: Mutex<Vec<Cmd>>,
    checked: Mutex<Vec<Cmd>>,
    scripted: Mutex<VecDeque<ExecResult>>,
    check_results: Mutex<VecDeque<bool>>,
    stdin_inputs: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next `exec`/`exec_with_input` call.
    pub fn push_result(&self, result: ExecResult) {
        self.scripted.lock().push_back(result);
    }

    /// Queue an exit code with empty output.
    pub fn push_exit(&self, exit_code: i32) {
        self.push_result(ExecResult { exit_code, stdout: String::new(), stderr: String::new() });
    }

    /// Queue an answer for the next `check` call.
    pub fn push_check(&self, value: bool) {
        self.check_results.lock().push_back(value);
    }

    /// Every command executed (not checked), in order.
    pub fn executed(&self) -> Vec<Cmd> {
        self.executed.lock().clone()
    }

    /// Rendered command lines, for compact assertions.
    pub fn executed_lines(&self) -> Vec<String> {
        self.executed.lock().iter().map(Cmd::display_line).collect()
    }

    /// Every command probed via `check`, in order.
    pub fn checked_lines(&self) -> Vec<String> {
        self.checked.lock().iter().map(Cmd::display_line).collect()
    }

    /// Stdin payloads passed to `exec_with_input`.
    pub fn stdin_inputs(&self) -> Vec<String> {
        self.stdin_inputs.lock().clone()
    }

    fn next_result(&self) -> ExecResult {
        self.scripted.lock().pop_front().unwrap_or_else(ExecResult::noop)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn exec(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        self.executed.lock().push(cmd.clone());
        Ok(self.next_result())
    }

    async fn exec_with_input(&self, cmd: &Cmd, input: &str) -> Result<ExecResult, CommandError> {
        self.executed.lock().push(cmd.clone());
        self.stdin_inputs.lock().push(input.to_string());
        Ok(self.next_result())
    }

    fn exec_sync(&self, cmd: &Cmd) -> Result<ExecResult, CommandError> {
        self.executed.lock().push(cmd.clone());
        Ok(self.next_result())
    }

    async fn check(&self, cmd: &Cmd) -> bool {
        self.checked.lock().push(cmd.clone());
        self.check_results.lock().pop_front().unwrap_or(false)
    }
}

// file: src/runner/mock.rs
// version: 1.0.0
// guid: f27b4c90-1d6e-4a35-b8c2-9e0a5d3f7142

//! Scriptable runner for tests; records every command it is given

use super::{CapturedOutput, CommandSpec, ExitOutcome, ProcessRunner};
use crate::error::{Result, UploadError};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<CommandSpec>,
    captures: VecDeque<CapturedOutput>,
    exit_code: i32,
    missing: HashSet<String>,
}

/// In-memory `ProcessRunner`; clones share state
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit code returned by every `run`
    pub fn with_exit_code(self, code: i32) -> Self {
        self.lock().exit_code = code;
        self
    }

    /// Queue the output of the next `capture`
    pub fn push_capture(&self, output: CapturedOutput) {
        self.lock().captures.push_back(output);
    }

    /// Queue a successful `capture` printing `stdout`
    pub fn push_stdout(&self, stdout: impl Into<String>) {
        self.push_capture(CapturedOutput {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        });
    }

    /// Pretend the program is not installed
    pub fn without_program(self, program: &str) -> Self {
        self.lock().missing.insert(program.to_string());
        self
    }

    /// Every command seen so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // a poisoned lock only happens after a panicking test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, command: &CommandSpec) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(command.clone());
        if state.missing.contains(&command.program) {
            return Err(UploadError::tool_not_found(&command.program));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProcessRunner for MockRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome> {
        self.record(command)?;
        Ok(ExitOutcome {
            code: self.lock().exit_code,
        })
    }

    async fn capture(&self, command: &CommandSpec) -> Result<CapturedOutput> {
        self.record(command)?;
        Ok(self.lock().captures.pop_front().unwrap_or(CapturedOutput {
            exit_code: Some(0),
            ..CapturedOutput::default()
        }))
    }

    fn is_available(&self, command: &CommandSpec) -> bool {
        !self.lock().missing.contains(&command.program)
    }
}

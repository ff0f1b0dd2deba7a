// file: src/runner/local.rs
// version: 1.0.0
// guid: 6e2d8f13-a5c7-4b90-9d1e-3c4f7a8b0e56

//! Local process execution

use super::{CapturedOutput, CommandSpec, ExitOutcome, ProcessRunner};
use crate::error::{Result, UploadError};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs commands on this machine with `tokio::process`
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    /// Locate the program, honouring a `PATH` override on the command
    fn resolve_program(&self, command: &CommandSpec) -> Result<PathBuf> {
        let found = match command.env_value("PATH") {
            Some(path) => {
                let cwd = std::env::current_dir()?;
                which::which_in(&command.program, Some(path), cwd)
            }
            None => which::which(&command.program),
        };

        found.map_err(|_| UploadError::tool_not_found(&command.program))
    }

    fn build(&self, command: &CommandSpec) -> Result<Command> {
        let program = self.resolve_program(command)?;
        let mut cmd = Command::new(program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait::async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome> {
        debug!("Executing command: {}", command.redacted());

        let status = self
            .build(command)?
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| UploadError::ProcessError {
                command: command.redacted(),
                exit_code: None,
                stderr: format!("Failed to execute command: {}", e),
            })?;

        let outcome = ExitOutcome::from_status(status);
        debug!("Command exited with code {}", outcome.code);
        Ok(outcome)
    }

    async fn capture(&self, command: &CommandSpec) -> Result<CapturedOutput> {
        debug!("Executing command with output: {}", command.redacted());

        let output = self
            .build(command)?
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| UploadError::ProcessError {
                command: command.redacted(),
                exit_code: None,
                stderr: format!("Failed to execute command: {}", e),
            })?;

        let captured = CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !captured.success() {
            error!("Command failed with exit code {:?}", captured.exit_code);
            if !captured.stderr.trim().is_empty() {
                error!("STDERR: {}", captured.stderr.trim());
            }
        }

        Ok(captured)
    }

    fn is_available(&self, command: &CommandSpec) -> bool {
        self.resolve_program(command).is_ok()
    }
}

// file: src/runner/mod.rs
// version: 1.0.0
// guid: 0a9e3c57-d4b1-4f28-86e3-b17c5d2f9e04

//! Process execution for the external environment manager and upload tool

pub mod local;
pub mod mock;

pub use local::SystemRunner;
pub use mock::MockRunner;

use crate::Result;
use std::fmt;
use std::process::ExitStatus;

/// Placeholder printed instead of secret arguments
pub const REDACTED: &str = "***";

/// A fully described external command; arguments are never shell-interpreted
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Argument values hidden from logs and dry runs
    secrets: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            secrets: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an argument whose value must not appear in any rendering
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        self.secrets.push(arg.clone());
        self.args.push(arg);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value of an environment override, if one is set
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full argv with secrets replaced, suitable for logs
    pub fn redacted_argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| {
                if self.secrets.iter().any(|s| s == arg) {
                    REDACTED.to_string()
                } else {
                    arg.clone()
                }
            }))
            .collect()
    }

    /// Command line with secrets replaced, quoted for copy and paste
    pub fn redacted(&self) -> String {
        self.redacted_argv()
            .iter()
            .map(|arg| quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("argv", &self.redacted_argv())
            .field("env", &self.env)
            .finish()
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_alphanumeric() || "-_./:=*@+,".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Exit status of a finished external process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: i32,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Map a process status to a shell-style exit code
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self { code: 128 + signal };
            }
        }

        Self { code: 1 }
    }
}

/// Output captured from a helper command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for running external commands
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run with inherited stdio and report the exit status
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome>;

    /// Run and collect stdout/stderr
    async fn capture(&self, command: &CommandSpec) -> Result<CapturedOutput>;

    /// Whether the program can be found for this command
    fn is_available(&self, command: &CommandSpec) -> bool;
}

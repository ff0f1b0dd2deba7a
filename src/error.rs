// file: src/error.rs
// version: 1.0.0
// guid: 3f1c2a9e-7b4d-4e61-9a02-5d8c6e1f0b27

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, UploadError>;

/// Error types for the package uploader
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No package archives matched {pattern}")]
    NoArtifacts { pattern: String },

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Tool not found on PATH: {0}")]
    ToolNotFound(String),

    #[error("Command `{command}` failed with exit code {exit_code:?}: {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl UploadError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new environment error
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Create a new tool not found error
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound(tool.into())
    }

    /// Exit code reported when the failure happens before the upload tool runs
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProcessError {
                exit_code: Some(code),
                ..
            } => *code,
            _ => 1,
        }
    }
}

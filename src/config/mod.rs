// file: src/config/mod.rs
// version: 1.0.0
// guid: 8d2e4b61-0c3a-4f95-b7e8-1a6f9c3d2e40

//! Upload configuration
//!
//! Holds the handful of values a publish run needs: which package to upload,
//! where the build output lives, who to upload as and where the token comes
//! from. Values come from a YAML file, the process environment and the CLI.

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::{Result, UploadError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the upload token unless configured otherwise
pub const DEFAULT_TOKEN_ENV: &str = "ANACONDA_TOKEN";

/// Environment variable conda-build uses for its output directory
pub const BUILD_PATH_ENV: &str = "CONDA_BLD_PATH";

/// Settings for a single publish run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Package name, or a glob matched against archive file names
    pub package: Option<String>,
    /// Destination user or organization on the repository
    pub user: Option<String>,
    /// Build output directory containing per-platform subdirectories
    pub build_dir: Option<PathBuf>,
    /// Name of the environment variable carrying the token
    pub token_env: String,
    /// Environment to activate before uploading
    pub environment: Option<String>,
    /// Channel label to upload under
    pub label: Option<String>,
    /// Overwrite existing files on the repository
    pub force: bool,
    /// Upload command-line tool
    pub tool: String,
    /// Environment manager used for activation
    pub manager: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            package: None,
            user: None,
            build_dir: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            environment: None,
            label: None,
            force: true,
            tool: "anaconda".to_string(),
            manager: "conda".to_string(),
        }
    }
}

impl UploadConfig {
    /// Check that every value needed for an upload is present and sane
    pub fn validate(&self) -> Result<()> {
        let package = self
            .package
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if package.is_empty() {
            return Err(UploadError::validation("package name must not be empty"));
        }
        if package.contains('/') || package.contains('\\') {
            return Err(UploadError::validation(format!(
                "package pattern must not contain path separators: {}",
                package
            )));
        }

        let user = self.user.as_deref().unwrap_or_default();
        if user.is_empty() {
            return Err(UploadError::validation("upload user must not be empty"));
        }
        let user_re = Regex::new(r"^[A-Za-z0-9_.-]+$")
            .map_err(|e| UploadError::config(format!("Invalid regex pattern: {}", e)))?;
        if !user_re.is_match(user) {
            return Err(UploadError::validation(format!(
                "invalid upload user: {}",
                user
            )));
        }

        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(UploadError::validation("label must not be empty"));
            }
        }

        if self.token_env.trim().is_empty() {
            return Err(UploadError::validation(
                "token environment variable name must not be empty",
            ));
        }
        if self.tool.trim().is_empty() {
            return Err(UploadError::validation("upload tool must not be empty"));
        }

        match &self.build_dir {
            None => Err(UploadError::validation(format!(
                "build directory not set (use --build-dir or {})",
                BUILD_PATH_ENV
            ))),
            Some(dir) if !dir.is_dir() => Err(UploadError::validation(format!(
                "build directory does not exist: {}",
                dir.display()
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Package pattern, validated to be present
    pub fn package_pattern(&self) -> Result<&str> {
        self.package
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| UploadError::validation("package name must not be empty"))
    }
}

/// Values supplied on the command line; `None` leaves the loaded value alone
#[derive(Debug, Clone, Default)]
pub struct UploadOverrides {
    pub package: Option<String>,
    pub user: Option<String>,
    pub build_dir: Option<PathBuf>,
    pub token_env: Option<String>,
    pub environment: Option<String>,
    pub label: Option<String>,
    pub no_force: bool,
    pub tool: Option<String>,
    pub manager: Option<String>,
}

impl UploadOverrides {
    /// Apply command line values on top of a loaded configuration
    pub fn apply(self, config: &mut UploadConfig) {
        if let Some(package) = self.package {
            config.package = Some(package);
        }
        if let Some(user) = self.user {
            config.user = Some(user);
        }
        if let Some(dir) = self.build_dir {
            config.build_dir = Some(dir);
        }
        if let Some(token_env) = self.token_env {
            config.token_env = token_env;
        }
        if let Some(environment) = self.environment {
            config.environment = Some(environment);
        }
        if let Some(label) = self.label {
            config.label = Some(label);
        }
        if self.no_force {
            config.force = false;
        }
        if let Some(tool) = self.tool {
            config.tool = tool;
        }
        if let Some(manager) = self.manager {
            config.manager = manager;
        }
    }
}

/// Upload credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value, only for handing to the upload tool
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

// file: src/environment/mod.rs
// version: 1.0.0
// guid: 9c3a1e78-5f2d-4b06-a4e9-d86b0c7f2a15

//! Package-management environment activation
//!
//! Activating a conda environment in a shell mutates that shell's variables,
//! which a child process cannot do for its parent. Instead the environment's
//! prefix is looked up with `conda info --json` and the variables an
//! activation would set are handed to the upload process.

use crate::error::{Result, UploadError};
use crate::runner::{CommandSpec, ProcessRunner};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name conda gives its root environment
pub const BASE_ENV: &str = "base";

/// The parts of `conda info --json` needed to find an environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentIndex {
    pub root_prefix: PathBuf,
    #[serde(default)]
    pub envs: Vec<PathBuf>,
}

impl EnvironmentIndex {
    /// Prefix for a name, `base`, or an absolute prefix path
    ///
    /// The listing order of `envs` is not meaningful; the root is identified
    /// only through `root_prefix`.
    pub fn select(&self, name: &str) -> Result<PathBuf> {
        if name == BASE_ENV {
            return Ok(self.root_prefix.clone());
        }

        let as_path = Path::new(name);
        if as_path.is_absolute() {
            if as_path == self.root_prefix
                || self.envs.iter().any(|p| p.as_path() == as_path)
            {
                return Ok(as_path.to_path_buf());
            }
        } else if let Some(found) = self
            .named()
            .find(|p| p.file_name().is_some_and(|n| n == name))
        {
            return Ok(found.clone());
        }

        let known: Vec<String> = std::iter::once(BASE_ENV.to_string())
            .chain(self.named().map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string())
            }))
            .collect();

        Err(UploadError::environment(format!(
            "Unknown environment {} (known: {})",
            name,
            known.join(", ")
        )))
    }

    /// Every listed environment except the root
    fn named(&self) -> impl Iterator<Item = &PathBuf> {
        self.envs.iter().filter(move |p| **p != self.root_prefix)
    }
}

/// Variables describing an activated environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedEnvironment {
    pub name: String,
    pub prefix: PathBuf,
    pub vars: Vec<(String, String)>,
}

impl ActivatedEnvironment {
    /// Build the activation variables for `prefix` on top of `inherited_path`
    pub fn new(name: &str, prefix: PathBuf, inherited_path: Option<OsString>) -> Result<Self> {
        let mut dirs = bin_dirs(&prefix);
        if let Some(path) = inherited_path {
            dirs.extend(std::env::split_paths(&path));
        }
        let path = std::env::join_paths(dirs)
            .map_err(|e| UploadError::environment(format!("Invalid PATH entry: {}", e)))?;

        let vars = vec![
            ("PATH".to_string(), path.to_string_lossy().into_owned()),
            (
                "CONDA_PREFIX".to_string(),
                prefix.to_string_lossy().into_owned(),
            ),
            ("CONDA_DEFAULT_ENV".to_string(), name.to_string()),
        ];

        Ok(Self {
            name: name.to_string(),
            prefix,
            vars,
        })
    }

    /// Apply the activation variables to a command
    pub fn apply(&self, mut command: CommandSpec) -> CommandSpec {
        for (key, value) in &self.vars {
            command = command.env(key, value);
        }
        command
    }
}

#[cfg(windows)]
fn bin_dirs(prefix: &Path) -> Vec<PathBuf> {
    vec![
        prefix.to_path_buf(),
        prefix.join("Library").join("bin"),
        prefix.join("Scripts"),
    ]
}

#[cfg(not(windows))]
fn bin_dirs(prefix: &Path) -> Vec<PathBuf> {
    vec![prefix.join("bin")]
}

/// Looks up environments through the environment manager
pub struct EnvironmentActivator<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    manager: String,
}

impl<'a, R: ProcessRunner + ?Sized> EnvironmentActivator<'a, R> {
    pub fn new(runner: &'a R, manager: impl Into<String>) -> Self {
        Self {
            runner,
            manager: manager.into(),
        }
    }

    /// Command used to query environments
    pub fn info_command(&self) -> CommandSpec {
        CommandSpec::new(&self.manager).args(["info", "--json"])
    }

    /// Root prefix and every known environment
    pub async fn index(&self) -> Result<EnvironmentIndex> {
        let command = self.info_command();
        let output = self.runner.capture(&command).await?;

        if !output.success() {
            return Err(UploadError::ProcessError {
                command: command.redacted(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let index: EnvironmentIndex = serde_json::from_str(&output.stdout)?;
        debug!(
            "{} environments known to {} (root {})",
            index.envs.len(),
            self.manager,
            index.root_prefix.display()
        );
        Ok(index)
    }

    /// Resolve an environment by name (or prefix path) and build its variables
    pub async fn activate(&self, name: &str) -> Result<ActivatedEnvironment> {
        let prefix = self.index().await?.select(name)?;

        info!("Activating environment {} ({})", name, prefix.display());
        ActivatedEnvironment::new(name, prefix, std::env::var_os("PATH"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CapturedOutput, MockRunner};

    // conda sorts envs by path, so a user env can come before the root
    const CONDA_INFO: &str = r#"{
        "root_prefix": "/opt/conda",
        "active_prefix": null,
        "envs": ["/home/me/envs/docs", "/opt/conda", "/opt/conda/envs/build"]
    }"#;

    #[tokio::test]
    async fn test_activate_named_env() -> Result<()> {
        let runner = MockRunner::new();
        runner.push_stdout(CONDA_INFO);

        let activator = EnvironmentActivator::new(&runner, "conda");
        let env = activator.activate("build").await?;

        assert_eq!(env.prefix, PathBuf::from("/opt/conda/envs/build"));
        assert_eq!(runner.calls()[0].redacted(), "conda info --json");

        let spec = env.apply(CommandSpec::new("anaconda"));
        assert_eq!(spec.env_value("CONDA_DEFAULT_ENV"), Some("build"));
        assert_eq!(spec.env_value("CONDA_PREFIX"), Some("/opt/conda/envs/build"));
        Ok(())
    }

    #[tokio::test]
    async fn test_activate_base_env() -> Result<()> {
        let runner = MockRunner::new();
        runner.push_stdout(CONDA_INFO);

        let env = EnvironmentActivator::new(&runner, "conda")
            .activate("base")
            .await?;
        assert_eq!(env.prefix, PathBuf::from("/opt/conda"));
        Ok(())
    }

    #[tokio::test]
    async fn test_env_sorted_before_root_is_found_by_name() -> Result<()> {
        // Arrange
        let runner = MockRunner::new();
        runner.push_stdout(CONDA_INFO);
        let activator = EnvironmentActivator::new(&runner, "conda");

        // Act
        let docs = activator.activate("docs").await?;

        // Assert
        assert_eq!(docs.prefix, PathBuf::from("/home/me/envs/docs"));
        Ok(())
    }

    #[test]
    fn test_select_by_prefix_path() -> Result<()> {
        let index: EnvironmentIndex = serde_json::from_str(CONDA_INFO)?;

        assert_eq!(index.select("/opt/conda")?, PathBuf::from("/opt/conda"));
        assert_eq!(
            index.select("/opt/conda/envs/build")?,
            PathBuf::from("/opt/conda/envs/build")
        );
        assert!(index.select("/nowhere").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_env_lists_known_names() {
        let runner = MockRunner::new();
        runner.push_stdout(CONDA_INFO);

        let err = EnvironmentActivator::new(&runner, "conda")
            .activate("conda")
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("Unknown environment conda"));
        assert!(err.contains("known: base, docs, build)"));
    }

    #[tokio::test]
    async fn test_manager_failure_propagates() {
        let runner = MockRunner::new();
        runner.push_capture(CapturedOutput {
            exit_code: Some(2),
            stdout: String::new(),
            stderr: "CondaError: broken\n".to_string(),
        });

        let err = EnvironmentActivator::new(&runner, "conda")
            .activate("build")
            .await
            .unwrap_err();
        match err {
            UploadError::ProcessError {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(2));
                assert_eq!(stderr, "CondaError: broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let runner = MockRunner::new();
        runner.push_stdout("not json");

        let err = EnvironmentActivator::new(&runner, "conda")
            .activate("build")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Json(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_prefixed_with_env_bin() -> Result<()> {
        let env = ActivatedEnvironment::new(
            "build",
            PathBuf::from("/opt/conda/envs/build"),
            Some(OsString::from("/usr/bin:/bin")),
        )?;
        let path = env
            .vars
            .iter()
            .find(|(k, _)| k == "PATH")
            .map(|(_, v)| v.as_str());
        assert_eq!(path, Some("/opt/conda/envs/build/bin:/usr/bin:/bin"));
        Ok(())
    }
}

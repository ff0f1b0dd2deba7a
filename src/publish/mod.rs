// file: src/publish/mod.rs
// version: 1.0.0
// guid: 7a4e0c26-b93f-4d18-8e57-c1f2a6d9b380

//! Publishing pipeline: resolve archives, activate, upload

pub mod artifacts;
pub mod command;

pub use artifacts::{resolve, Artifact};
pub use command::build_upload_command;

use crate::config::{ConfigLoader, UploadConfig};
use crate::environment::{ActivatedEnvironment, EnvironmentActivator};
use crate::error::{Result, UploadError};
use crate::logging::logger::with_async_operation_span;
use crate::runner::{CommandSpec, ExitOutcome, ProcessRunner};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything needed to run the upload, resolved but not executed
#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub command: CommandSpec,
    pub artifacts: Vec<Artifact>,
    pub environment: Option<ActivatedEnvironment>,
}

/// Printable form of a plan; the token is redacted
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub command: Vec<String>,
    pub artifacts: Vec<PathBuf>,
    pub environment: Option<String>,
    pub prefix: Option<PathBuf>,
}

impl UploadPlan {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            command: self.command.redacted_argv(),
            artifacts: self.artifacts.iter().map(|a| a.path.clone()).collect(),
            environment: self.environment.as_ref().map(|e| e.name.clone()),
            prefix: self.environment.as_ref().map(|e| e.prefix.clone()),
        }
    }
}

/// Drives a publish run against a process runner
pub struct Publisher<R: ProcessRunner> {
    runner: R,
    loader: ConfigLoader,
}

impl<R: ProcessRunner> Publisher<R> {
    pub fn new(runner: R, loader: ConfigLoader) -> Self {
        Self { runner, loader }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Resolve archives, token and environment into an upload command
    pub async fn plan(&self, config: &UploadConfig) -> Result<UploadPlan> {
        config.validate()?;
        let token = self.loader.token(config)?;

        let build_dir = config
            .build_dir
            .as_deref()
            .ok_or_else(|| UploadError::validation("build directory not set"))?;
        let artifacts = resolve(build_dir, config.package_pattern()?)?;
        info!(
            "Found {} package archive(s) in {}",
            artifacts.len(),
            build_dir.display()
        );

        let environment = match config.environment.as_deref() {
            Some(name) => {
                let activator = EnvironmentActivator::new(&self.runner, &config.manager);
                let env =
                    with_async_operation_span("activate", || activator.activate(name)).await?;
                Some(env)
            }
            None => None,
        };

        let command = build_upload_command(config, &token, &artifacts, environment.as_ref())?;
        Ok(UploadPlan {
            command,
            artifacts,
            environment,
        })
    }

    /// Run the upload and return the tool's exit status unchanged
    pub async fn upload(&self, config: &UploadConfig) -> Result<ExitOutcome> {
        let plan = self.plan(config).await?;

        info!(
            "Uploading {} archive(s) as {}",
            plan.artifacts.len(),
            config.user.as_deref().unwrap_or_default()
        );
        info!("Running: {}", plan.command.redacted());

        let outcome =
            with_async_operation_span("upload", || self.runner.run(&plan.command)).await?;

        if outcome.success() {
            info!("Upload finished successfully");
        } else {
            warn!("{} exited with code {}", config.tool, outcome.code);
        }
        Ok(outcome)
    }
}

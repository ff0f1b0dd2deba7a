// file: src/cli/commands.rs
// version: 1.0.0
// guid: 5c0e8a17-4d93-4b6f-a2e8-b71f3c9d0e45

//! Command implementations for the CLI
//!
//! Each command returns the process exit code. For `upload` that is the
//! upload tool's own status.

use super::args::UploadArgs;
use crate::{
    config::{ConfigLoader, UploadConfig, UploadOverrides},
    environment::EnvironmentActivator,
    publish::{resolve, Publisher},
    runner::{CommandSpec, ProcessRunner, SystemRunner},
    Result,
};
use colored::Colorize;
use std::path::Path;
use tracing::{error, info};

/// Load the file/environment configuration and apply command line values
pub fn load_config(
    loader: &ConfigLoader,
    config_path: Option<&Path>,
    args: UploadArgs,
) -> Result<UploadConfig> {
    let mut config = loader.load_or_default(config_path)?;
    UploadOverrides::from(args).apply(&mut config);
    loader.apply_env(&mut config);
    Ok(config)
}

/// Upload matching archives
pub async fn upload_command(config_path: Option<&Path>, args: UploadArgs) -> Result<i32> {
    let loader = ConfigLoader::new();
    let config = load_config(&loader, config_path, args)?;

    let publisher = Publisher::new(SystemRunner::new(), loader);
    let outcome = publisher.upload(&config).await?;
    Ok(outcome.code)
}

/// Print the upload command without running it
pub async fn plan_command(config_path: Option<&Path>, args: UploadArgs, json: bool) -> Result<i32> {
    let loader = ConfigLoader::new();
    let config = load_config(&loader, config_path, args)?;

    let publisher = Publisher::new(SystemRunner::new(), loader);
    let plan = publisher.plan(&config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan.summary())?);
    } else {
        if let Some(env) = &plan.environment {
            println!("# environment: {} ({})", env.name, env.prefix.display());
        }
        println!("{}", plan.command.redacted());
    }
    Ok(0)
}

/// Report readiness for an upload
pub async fn check_command(config_path: Option<&Path>, args: UploadArgs) -> Result<i32> {
    let loader = ConfigLoader::new();
    let config = load_config(&loader, config_path, args)?;

    let checks = run_checks(&SystemRunner::new(), &loader, &config).await;
    for check in &checks {
        let mark = if check.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("{} {}: {}", mark, check.name, check.detail);
    }

    if checks.iter().all(|c| c.passed) {
        info!("All upload prerequisites are satisfied");
        Ok(0)
    } else {
        error!("Some upload prerequisites are missing");
        Ok(1)
    }
}

/// Outcome of a single readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Run every readiness check; failures are collected, not returned early
pub async fn run_checks<R: ProcessRunner>(
    runner: &R,
    loader: &ConfigLoader,
    config: &UploadConfig,
) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    checks.push(match config.validate() {
        Ok(()) => CheckResult::pass("configuration", "complete"),
        Err(e) => CheckResult::fail("configuration", e.to_string()),
    });

    checks.push(match loader.token(config) {
        Ok(_) => CheckResult::pass("token", format!("{} is set", config.token_env)),
        Err(e) => CheckResult::fail("token", e.to_string()),
    });

    checks.push(match (&config.build_dir, config.package.as_deref()) {
        (Some(dir), Some(package)) if dir.is_dir() => match resolve(dir, package) {
            Ok(found) => CheckResult::pass("archives", format!("{} found", found.len())),
            Err(e) => CheckResult::fail("archives", e.to_string()),
        },
        _ => CheckResult::fail("archives", "build directory or package not set"),
    });

    let mut tool = CommandSpec::new(&config.tool);
    match config.environment.as_deref() {
        Some(name) => {
            let activator = EnvironmentActivator::new(runner, &config.manager);
            if !runner.is_available(&activator.info_command()) {
                checks.push(CheckResult::fail(
                    "manager",
                    format!("{} not found on PATH", config.manager),
                ));
            } else {
                match activator.activate(name).await {
                    Ok(env) => {
                        checks.push(CheckResult::pass(
                            "environment",
                            format!("{} at {}", name, env.prefix.display()),
                        ));
                        tool = env.apply(tool);
                    }
                    Err(e) => checks.push(CheckResult::fail("environment", e.to_string())),
                }
            }
        }
        None => checks.push(CheckResult::pass("environment", "none requested")),
    }

    checks.push(if runner.is_available(&tool) {
        CheckResult::pass("tool", format!("{} available", config.tool))
    } else {
        CheckResult::fail("tool", format!("{} not found on PATH", config.tool))
    });

    checks
}

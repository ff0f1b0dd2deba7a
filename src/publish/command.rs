// file: src/publish/command.rs
// version: 1.0.0
// guid: 2d6b9f40-8c1e-4e73-a5f2-07e3b9c4d618

//! Upload command line construction

use super::artifacts::Artifact;
use crate::config::{Token, UploadConfig};
use crate::environment::ActivatedEnvironment;
use crate::error::{Result, UploadError};
use crate::runner::CommandSpec;

/// Build the upload invocation
///
/// Produces `<tool> -t <token> upload -u <user> [--label <label>] [--force]
/// <archive>...`, with the activation variables applied when an environment
/// was activated.
pub fn build_upload_command(
    config: &UploadConfig,
    token: &Token,
    artifacts: &[Artifact],
    environment: Option<&ActivatedEnvironment>,
) -> Result<CommandSpec> {
    let user = config
        .user
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| UploadError::validation("upload user must not be empty"))?;

    if artifacts.is_empty() {
        return Err(UploadError::validation("no package archives to upload"));
    }

    let mut command = CommandSpec::new(&config.tool)
        .arg("-t")
        .secret_arg(token.expose())
        .args(["upload", "-u", user]);

    if let Some(label) = &config.label {
        command = command.args(["--label", label.as_str()]);
    }
    if config.force {
        command = command.arg("--force");
    }

    command = command.args(
        artifacts
            .iter()
            .map(|a| a.path.to_string_lossy().into_owned()),
    );

    Ok(match environment {
        Some(env) => env.apply(command),
        None => command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn artifacts() -> Vec<Artifact> {
        vec![Artifact {
            path: PathBuf::from("/bld/noarch/rigid-body-motion-0.9.1-py_0.tar.bz2"),
        }]
    }

    fn config() -> UploadConfig {
        UploadConfig {
            package: Some("rigid-body-motion".to_string()),
            user: Some("phausamann".to_string()),
            build_dir: Some(PathBuf::from("/bld")),
            ..UploadConfig::default()
        }
    }

    #[test]
    fn test_exact_argv() -> Result<()> {
        let token = Token::new("TOKEN");
        let command = build_upload_command(&config(), &token, &artifacts(), None)?;

        assert_eq!(command.program, "anaconda");
        assert_eq!(
            command.args,
            vec![
                "-t",
                "TOKEN",
                "upload",
                "-u",
                "phausamann",
                "--force",
                "/bld/noarch/rigid-body-motion-0.9.1-py_0.tar.bz2",
            ]
        );
        assert!(command.env.is_empty());
        Ok(())
    }

    #[test]
    fn test_redacted_never_shows_token() -> Result<()> {
        let token = Token::new("s3cr3t-value");
        let command = build_upload_command(&config(), &token, &artifacts(), None)?;

        let shown = command.redacted();
        assert!(!shown.contains("s3cr3t-value"));
        assert!(shown.starts_with("anaconda -t *** upload -u phausamann --force"));
        Ok(())
    }

    #[test]
    fn test_label_and_no_force() -> Result<()> {
        let mut config = config();
        config.label = Some("dev".to_string());
        config.force = false;
        let command = build_upload_command(&config, &Token::new("t"), &artifacts(), None)?;

        assert_eq!(&command.args[2..7], ["upload", "-u", "phausamann", "--label", "dev"]);
        assert!(!command.args.iter().any(|a| a == "--force"));
        Ok(())
    }

    #[test]
    fn test_environment_vars_applied() -> Result<()> {
        let env = ActivatedEnvironment::new("build", PathBuf::from("/opt/conda/envs/build"), None)?;
        let command =
            build_upload_command(&config(), &Token::new("t"), &artifacts(), Some(&env))?;

        assert_eq!(command.env_value("CONDA_DEFAULT_ENV"), Some("build"));
        assert!(command.env_value("PATH").is_some());
        Ok(())
    }

    #[test]
    fn test_requires_artifacts() {
        let err = build_upload_command(&config(), &Token::new("t"), &[], None).unwrap_err();
        assert!(matches!(err, UploadError::Validation(_)));
    }
}

// file: tests/integration_test.rs
// version: 1.0.0
// guid: 0f4c7e29-b8d1-4a53-9e60-2d7a1c5b8f34

//! Integration tests for the publishing pipeline

use pkg_uploader::{
    config::{ConfigLoader, UploadConfig, UploadOverrides},
    publish::Publisher,
    runner::{CapturedOutput, MockRunner},
    Result, UploadError,
};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn build_output(dir: &TempDir) {
    for rel in [
        "noarch/rigid-body-motion-0.9.1-py_0.tar.bz2",
        "linux-64/rigid-body-motion-0.9.1-py38h1234_0.tar.bz2",
        "noarch/rigid-body-motion-docs-0.9.1-0.tar.bz2",
        "noarch/current_repodata.json",
    ] {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"archive").unwrap();
    }
}

fn loader_with(vars: &[(&str, &str)]) -> ConfigLoader {
    ConfigLoader::with_env(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

#[tokio::test]
async fn test_config_file_to_upload() -> Result<()> {
    let bld = TempDir::new().unwrap();
    build_output(&bld);

    let cfg_dir = TempDir::new().unwrap();
    let cfg_path = cfg_dir.path().join("upload.yaml");
    fs::write(
        &cfg_path,
        "package: rigid-body-motion-0.9.1-*\nuser: ${UPLOAD_USER}\nenvironment: build\n",
    )?;

    let loader = loader_with(&[
        ("UPLOAD_USER", "phausamann"),
        ("ANACONDA_TOKEN", "tok-xyz"),
        ("CONDA_BLD_PATH", bld.path().to_str().unwrap()),
    ]);
    let config = loader.load(&cfg_path)?;

    let runner = MockRunner::new().with_exit_code(0);
    runner.push_stdout(
        r#"{"root_prefix": "/opt/conda", "envs": ["/opt/conda", "/opt/conda/envs/build"]}"#,
    );
    let publisher = Publisher::new(runner.clone(), loader);

    let outcome = publisher.upload(&config).await?;
    assert!(outcome.success());

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].args,
        vec!["info".to_string(), "--json".to_string()]
    );

    let upload = &calls[1];
    assert_eq!(upload.program, "anaconda");
    assert_eq!(
        upload.args[..6],
        ["-t", "tok-xyz", "upload", "-u", "phausamann", "--force"]
    );
    // docs package shares the prefix but not the version glob
    let files: Vec<_> = upload.args[6..]
        .iter()
        .map(|p| p.rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        files,
        vec![
            "rigid-body-motion-0.9.1-py38h1234_0.tar.bz2",
            "rigid-body-motion-0.9.1-py_0.tar.bz2",
        ]
    );
    assert_eq!(upload.env_value("CONDA_DEFAULT_ENV"), Some("build"));
    Ok(())
}

#[tokio::test]
async fn test_bare_name_matches_like_shell_glob() -> Result<()> {
    let bld = TempDir::new().unwrap();
    build_output(&bld);

    let loader = loader_with(&[("ANACONDA_TOKEN", "t")]);
    let mut config = UploadConfig::default();
    UploadOverrides {
        package: Some("rigid-body-motion".to_string()),
        user: Some("me".to_string()),
        build_dir: Some(bld.path().to_path_buf()),
        ..UploadOverrides::default()
    }
    .apply(&mut config);

    let runner = MockRunner::new();
    let plan = Publisher::new(runner, loader).plan(&config).await?;
    assert_eq!(plan.artifacts.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_exit_codes_pass_through() -> Result<()> {
    let bld = TempDir::new().unwrap();
    build_output(&bld);

    for code in [0, 1, 3, 42, 255] {
        let loader = loader_with(&[
            ("ANACONDA_TOKEN", "t"),
            ("CONDA_BLD_PATH", bld.path().to_str().unwrap()),
        ]);
        let mut config = UploadConfig::default();
        loader.apply_env(&mut config);
        config.package = Some("rigid-body-motion".to_string());
        config.user = Some("me".to_string());

        let publisher = Publisher::new(MockRunner::new().with_exit_code(code), loader);
        assert_eq!(publisher.upload(&config).await?.code, code);
    }
    Ok(())
}

#[tokio::test]
async fn test_activation_failure_skips_upload() {
    let bld = TempDir::new().unwrap();
    build_output(&bld);

    let loader = loader_with(&[("ANACONDA_TOKEN", "t")]);
    let config = UploadConfig {
        package: Some("rigid-body-motion".to_string()),
        user: Some("me".to_string()),
        build_dir: Some(bld.path().to_path_buf()),
        environment: Some("build".to_string()),
        ..Default::default()
    };

    let runner = MockRunner::new();
    runner.push_capture(CapturedOutput {
        exit_code: Some(1),
        stdout: String::new(),
        stderr: "conda: command failed".to_string(),
    });
    let publisher = Publisher::new(runner.clone(), loader);

    let err = publisher.upload(&config).await.unwrap_err();
    assert!(matches!(err, UploadError::ProcessError { .. }));
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_no_archives_is_an_error() {
    let bld = TempDir::new().unwrap();
    build_output(&bld);

    let loader = loader_with(&[("ANACONDA_TOKEN", "t")]);
    let config = UploadConfig {
        package: Some("numpy".to_string()),
        user: Some("me".to_string()),
        build_dir: Some(bld.path().to_path_buf()),
        ..Default::default()
    };

    let runner = MockRunner::new();
    let err = Publisher::new(runner.clone(), loader)
        .upload(&config)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::NoArtifacts { .. }));
    assert!(runner.calls().is_empty());
}

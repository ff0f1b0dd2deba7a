// file: src/config/loader.rs
// version: 1.0.0
// guid: c41e7a05-92d8-4b3f-8e16-7f0a5b2c9d83

//! Configuration file loading and environment variable substitution

use super::{Token, UploadConfig, BUILD_PATH_ENV};
use crate::error::{Result, UploadError};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Create a loader that sees only the given variables
    pub fn with_env(env_vars: HashMap<String, String>) -> Self {
        Self { env_vars }
    }

    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pkg-uploader").join("config.yaml"))
    }

    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<UploadConfig> {
        let content = fs::read_to_string(&path).map_err(|e| {
            UploadError::config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let mut config: UploadConfig = serde_yaml::from_str(&expanded)?;
        self.apply_env(&mut config);

        Ok(config)
    }

    /// Load an explicit file, else the default file if present, else defaults
    pub fn load_or_default(&self, path: Option<&Path>) -> Result<UploadConfig> {
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            return self.load(path);
        }

        if let Some(default) = Self::default_path().filter(|p| p.is_file()) {
            debug!("Loading configuration from {}", default.display());
            return self.load(default);
        }

        let mut config = UploadConfig::default();
        self.apply_env(&mut config);
        Ok(config)
    }

    /// Fill values the file left unset from the environment
    pub fn apply_env(&self, config: &mut UploadConfig) {
        if config.build_dir.is_none() {
            config.build_dir = self
                .env_vars
                .get(BUILD_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }
        config.build_dir = config.build_dir.take().map(|dir| expand_home(&dir));
    }

    /// Read the upload token from the configured variable
    pub fn token(&self, config: &UploadConfig) -> Result<Token> {
        match self.env_vars.get(&config.token_env) {
            Some(value) if !value.trim().is_empty() => Ok(Token::new(value.trim())),
            Some(_) => Err(UploadError::config(format!(
                "Environment variable {} is empty",
                config.token_env
            ))),
            None => Err(UploadError::config(format!(
                "Environment variable {} is not set",
                config.token_env
            ))),
        }
    }

    /// Expand environment variables in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| UploadError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut missing_vars = Vec::new();
        let result = re.replace_all(content, |cap: &regex::Captures| {
            let var_name = &cap[1];
            match self.env_vars.get(var_name) {
                Some(value) => value.clone(),
                None => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });

        if !missing_vars.is_empty() {
            return Err(UploadError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result.into_owned())
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

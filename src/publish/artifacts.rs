// file: src/publish/artifacts.rs
// version: 1.0.0
// guid: 5b7f0d2c-3e81-4a69-9c4d-e20b8f6a1735

//! Locate built package archives in the build output directory

use crate::error::{Result, UploadError};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// File suffixes of conda package archives
pub const ARCHIVE_SUFFIXES: [&str; 2] = [".tar.bz2", ".conda"];

/// A package archive ready for upload
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Artifact {
    pub path: PathBuf,
}

impl Artifact {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Turn a package name into the file glob used for matching
///
/// A bare name `foo` becomes `foo-*`; anything containing a wildcard is used
/// unchanged.
pub fn package_glob(package: &str) -> String {
    let package = package.trim();
    if package.contains('*') || package.contains('?') {
        package.to_string()
    } else {
        format!("{}-*", package)
    }
}

/// Find archives matching `<build_dir>/*/<glob>`, sorted by path
pub fn resolve(build_dir: &Path, package: &str) -> Result<Vec<Artifact>> {
    let glob = package_glob(package);
    let matcher = glob_to_regex(&glob)?;
    let explicit_suffix = ARCHIVE_SUFFIXES.iter().any(|s| glob.ends_with(s));

    let mut artifacts = Vec::new();
    let walker = WalkDir::new(build_dir)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() != 1 || !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {}", build_dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !matcher.is_match(name) {
            continue;
        }
        if !explicit_suffix && !ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }

        debug!("Matched package archive {}", entry.path().display());
        artifacts.push(Artifact {
            path: entry.into_path(),
        });
    }

    if artifacts.is_empty() {
        return Err(UploadError::NoArtifacts {
            pattern: build_dir.join("*").join(&glob).display().to_string(),
        });
    }

    artifacts.sort();
    Ok(artifacts)
}

// `*` in a shell glob never matches a leading dot
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Compile a shell-style glob (`*`, `?`) into an anchored regex
fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');

    Regex::new(&pattern)
        .map_err(|e| UploadError::validation(format!("Invalid package pattern {}: {}", glob, e)))
}

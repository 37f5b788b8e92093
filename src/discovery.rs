//! Spec file discovery and format-selected loading.
//!
//! The single core replaces the original's two near-duplicate tool
//! paths: one parser/validator pipeline with a thin adapter per input
//! format, selected by file extension.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::canon;
use crate::config::Config;
use crate::error::{Result, SsvError};
use crate::yaml;

/// Recognized spec file names, canonical form first.
pub const SPEC_FILENAMES: &[&str] = &["skill.json", "skill.yaml", "skill.yml"];

/// Recursively discover spec files under `root`, skipping excluded
/// directories. Returns sorted absolute paths.
pub fn find_skill_files(root: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SsvError::Config(format!(
            "root {} is not a readable directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || entry
                    .file_name()
                    .to_str()
                    .is_none_or(|name| !config.is_excluded_dir(name))
        });

    for entry in walker {
        let entry = entry.map_err(|err| SsvError::Io(format!("walk {}: {err}", root.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if SPEC_FILENAMES.contains(&name) {
            let path = std::path::absolute(entry.path())
                .map_err(|err| SsvError::io("resolve", entry.path(), &err))?;
            files.push(path);
        }
    }
    files.sort();
    debug!(count = files.len(), root = %root.display(), "discovered spec files");
    Ok(files)
}

/// Load one spec file, adapter selected by extension: `.json` through
/// the canonical JSON loader, `.yaml`/`.yml` through the restricted
/// parser.
pub fn load_spec_file(path: &Path) -> Result<Value> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => canon::load_json_file(path),
        Some("yaml" | "yml") => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| SsvError::io("read", path, &err))?;
            let value = yaml::parse_yaml(&text, &path.display().to_string())?;
            Ok(value.to_json())
        }
        _ => Err(SsvError::InvalidSpec(format!(
            "{}: unsupported spec format (expected .json, .yaml or .yml)",
            path.display()
        ))),
    }
}

/// A successfully parsed spec with its source path.
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    pub path: PathBuf,
    pub data: Value,
}

/// A document that failed to parse. Fatal to that one document only;
/// the rest of the batch keeps going.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of loading a whole document set.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub specs: Vec<LoadedSpec>,
    pub failures: Vec<LoadFailure>,
}

/// Discover and load every spec under `root`. Parse failures are
/// collected per document; I/O failures abort immediately.
pub fn load_specs(root: &Path, config: &Config) -> Result<LoadOutcome> {
    let mut outcome = LoadOutcome::default();
    for path in find_skill_files(root, config)? {
        match load_spec_file(&path) {
            Ok(data) => outcome.specs.push(LoadedSpec { path, data }),
            Err(SsvError::Parse(err)) => outcome.failures.push(LoadFailure {
                path,
                message: format!("line {}: {}", err.line, err.message),
            }),
            Err(SsvError::Json(message)) => {
                let prefix = format!("{}: ", path.display());
                let message = message
                    .strip_prefix(&prefix)
                    .map_or(message.clone(), ToString::to_string);
                outcome.failures.push(LoadFailure { path, message });
            }
            Err(other) => return Err(other),
        }
    }
    Ok(outcome)
}

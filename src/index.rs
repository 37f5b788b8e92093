//! Machine-readable skill index generation.
//!
//! Folds the discovered spec set into an id-sorted `{id, invocation,
//! package, spec_path, version}` list. This path is JSON-only and
//! fails fast: a legacy YAML spec or a spec missing id/version aborts
//! the build instead of producing a partial index.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::canon;
use crate::config::Config;
use crate::discovery;
use crate::error::{Result, SsvError};

pub const INDEX_SCHEMA_VERSION: &str = "1.0.0";

/// One indexed skill.
#[derive(Debug, Clone, Serialize)]
pub struct SkillIndexEntry {
    pub id: String,
    pub invocation: String,
    pub package: String,
    pub spec_path: String,
    pub version: String,
}

/// The generated index artifact.
#[derive(Debug, Serialize)]
pub struct SkillIndex {
    pub schema_version: String,
    pub skills: Vec<SkillIndexEntry>,
}

impl SkillIndex {
    /// Canonical serialized form: key-sorted, 2-space, trailing newline.
    pub fn render(&self) -> Result<String> {
        let value = serde_json::to_value(self).map_err(|err| SsvError::Json(err.to_string()))?;
        Ok(canon::stable_stringify(&canon::sort_keys(&value)))
    }
}

/// Build the index over every spec under `root`.
pub fn build_skill_index(root: &Path, config: &Config) -> Result<SkillIndex> {
    let root_abs = std::path::absolute(root).map_err(|err| SsvError::io("resolve", root, &err))?;
    let mut skills = Vec::new();

    for path in discovery::find_skill_files(&root_abs, config)? {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(SsvError::InvalidSpec(format!(
                "{}: the skill index requires canonical JSON specs",
                path.display()
            )));
        }
        let data = canon::load_json_file(&path)?;
        let id = required_field(&data, &path, "id")?;
        let version = required_field(&data, &path, "version")?;

        let spec_path = path
            .strip_prefix(&root_abs)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        skills.push(SkillIndexEntry {
            invocation: config.invocation(&id),
            package: config.package_name(&id),
            spec_path,
            id,
            version,
        });
    }

    skills.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(SkillIndex {
        schema_version: INDEX_SCHEMA_VERSION.to_string(),
        skills,
    })
}

fn required_field(data: &Value, path: &Path, key: &str) -> Result<String> {
    data[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| {
            SsvError::InvalidSpec(format!(
                "{}: missing or empty '{key}'",
                path.display()
            ))
        })
}

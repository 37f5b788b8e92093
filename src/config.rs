//! Runtime configuration.
//!
//! Pure data: resolution happens once at startup and the core modules
//! receive the resolved values. Environment overrides exist so CI and
//! tests can redirect naming without a config file.

use std::path::{Path, PathBuf};

/// Settings that shape discovery and artifact generation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scope for derived package names, e.g. `@skills`.
    pub package_scope: String,
    /// Prefix for derived package names, e.g. `skill`.
    pub package_prefix: String,
    /// Directory names skipped during discovery.
    pub exclude_dirs: Vec<String>,
    /// Generated index artifact, relative to the root.
    pub index_file: String,
    /// Generated inventory artifact, relative to the root.
    pub inventory_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_scope: "@skills".to_string(),
            package_prefix: "skill".to_string(),
            exclude_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
                "dist".to_string(),
            ],
            index_file: "skill-index.json".to_string(),
            inventory_file: "INVENTORY.md".to_string(),
        }
    }
}

impl Config {
    /// Defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(scope) = std::env::var("SSV_PACKAGE_SCOPE") {
            config.package_scope = scope;
        }
        if let Ok(prefix) = std::env::var("SSV_PACKAGE_PREFIX") {
            config.package_prefix = prefix;
        }
        config
    }

    /// Naming-convention transform from skill id to package name:
    /// `a/log-work` becomes `@skills/skill-a-log-work`.
    #[must_use]
    pub fn package_name(&self, id: &str) -> String {
        format!(
            "{}/{}-{}",
            self.package_scope,
            self.package_prefix,
            id.replace('/', "-")
        )
    }

    /// CLI invocation name for a skill: slashes become colons.
    #[must_use]
    pub fn invocation(&self, id: &str) -> String {
        id.replace('/', ":")
    }

    #[must_use]
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    #[must_use]
    pub fn index_path(&self, root: &Path) -> PathBuf {
        root.join(&self.index_file)
    }

    #[must_use]
    pub fn inventory_path(&self, root: &Path) -> PathBuf {
        root.join(&self.inventory_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_transform() {
        let config = Config::default();
        assert_eq!(config.package_name("a/log-work"), "@skills/skill-a-log-work");
        assert_eq!(config.package_name("solo"), "@skills/skill-solo");
    }

    #[test]
    fn invocation_transform() {
        let config = Config::default();
        assert_eq!(config.invocation("a/b/c"), "a:b:c");
        assert_eq!(config.invocation("solo"), "solo");
    }

    #[test]
    fn default_exclusions() {
        let config = Config::default();
        assert!(config.is_excluded_dir(".git"));
        assert!(config.is_excluded_dir("node_modules"));
        assert!(!config.is_excluded_dir("skills"));
    }
}

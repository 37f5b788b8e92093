//! Shared application context for CLI commands.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Result, SsvError};

/// Resolved once per invocation and handed to every command.
pub struct AppContext {
    /// Root of the skill repository being operated on.
    pub root: PathBuf,
    pub config: Config,
}

impl AppContext {
    /// Build the context from parsed CLI arguments.
    ///
    /// Root resolution order: `--root` flag (also `SSV_ROOT` via clap's
    /// env support), then the current directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().map_err(|err| {
                SsvError::Config(format!("cannot resolve current directory: {err}"))
            })?,
        };
        if !root.is_dir() {
            return Err(SsvError::Config(format!(
                "root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root,
            config: Config::from_env(),
        })
    }
}

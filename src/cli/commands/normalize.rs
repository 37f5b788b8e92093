//! ssv normalize - rewrite spec files in canonical JSON form.
//!
//! The only command that writes back to source documents, and only
//! when invoked explicitly. Running it twice produces no further diff.

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::canon::{load_json_file, sort_keys, stable_stringify};
use crate::cli::output::emit_ok;
use crate::error::{Result, SsvError};

use super::display_path;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Spec files to normalize
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &NormalizeArgs) -> Result<()> {
    let mut changed = 0usize;
    for path in &args.paths {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(SsvError::InvalidSpec(format!(
                "{}: normalize requires canonical JSON specs",
                path.display()
            )));
        }
        let original = std::fs::read_to_string(path)
            .map_err(|err| SsvError::io("read", path, &err))?;
        let data = load_json_file(path)?;
        let canonical = stable_stringify(&sort_keys(&data));
        if canonical != original {
            std::fs::write(path, &canonical)
                .map_err(|err| SsvError::io("write", path, &err))?;
            changed += 1;
            println!("normalized {}", display_path(ctx, path));
        }
    }
    emit_ok(&format!(
        "{changed} of {} file(s) rewritten",
        args.paths.len()
    ));
    Ok(())
}

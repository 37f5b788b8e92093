//! ssv validate - parse and schema-validate spec files.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{ErrorLine, emit_ok, emit_sorted};
use crate::discovery;
use crate::error::{Result, SsvError};
use crate::schema::validate_schema;

use super::display_path;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Spec files to validate (defaults to discovering all under the root)
    pub paths: Vec<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    let files = if args.paths.is_empty() {
        discovery::find_skill_files(&ctx.root, &ctx.config)?
    } else {
        args.paths.clone()
    };

    let mut lines = Vec::new();
    let mut valid = 0usize;
    for path in &files {
        let display = display_path(ctx, path);
        match load_for_report(path, &display, &mut lines)? {
            None => {}
            Some(data) => {
                let errors = validate_schema(&data);
                if errors.is_empty() {
                    valid += 1;
                }
                for err in errors {
                    lines.push(ErrorLine::new("SCHEMA", display.clone(), err.path, err.message));
                }
            }
        }
    }

    let count = emit_sorted(lines);
    if count > 0 {
        return Err(SsvError::ValidationFailed(format!(
            "{count} error(s) across {} file(s)",
            files.len()
        )));
    }
    emit_ok(&format!("{valid} spec(s) valid"));
    Ok(())
}

/// Load one spec, converting per-document parse failures into `[PARSE]`
/// report lines. I/O failures still propagate.
pub(crate) fn load_for_report(
    path: &Path,
    display: &str,
    lines: &mut Vec<ErrorLine>,
) -> Result<Option<serde_json::Value>> {
    match discovery::load_spec_file(path) {
        Ok(data) => Ok(Some(data)),
        Err(SsvError::Parse(err)) => {
            lines.push(ErrorLine::new(
                "PARSE",
                display,
                format!("line {}", err.line),
                err.message,
            ));
            Ok(None)
        }
        Err(SsvError::Json(message)) => {
            let prefix = format!("{}: ", path.display());
            let message = message
                .strip_prefix(&prefix)
                .map_or(message.clone(), ToString::to_string);
            lines.push(ErrorLine::new("PARSE", display, "-", message));
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

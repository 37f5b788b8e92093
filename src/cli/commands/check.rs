//! ssv check - full pipeline over the whole document set.
//!
//! Parse errors and schema errors keep a document out of the
//! cross-check set but never abort the run; exit codes distinguish
//! malformed documents (1) from an inconsistent document set (2).

use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::checks::{SpecDoc, run_cross_checks};
use crate::cli::output::{ErrorLine, emit_ok, emit_sorted};
use crate::error::{Result, SsvError};
use crate::index::build_skill_index;
use crate::inventory::{check_inventory, generate_inventory};
use crate::schema::validate_schema;
use crate::{discovery, schema};

use super::display_path;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Rewrite generated artifacts (index, inventory) in place.
    /// Source documents are never modified.
    #[arg(long)]
    pub fix: bool,
}

pub fn run(ctx: &AppContext, args: &CheckArgs) -> Result<()> {
    let outcome = discovery::load_specs(&ctx.root, &ctx.config)?;
    let mut lines = Vec::new();
    let mut document_errors = 0usize;

    for failure in &outcome.failures {
        document_errors += 1;
        lines.push(ErrorLine::new(
            "PARSE",
            display_path(ctx, &failure.path),
            "-",
            failure.message.clone(),
        ));
    }

    let mut valid_docs: Vec<SpecDoc> = Vec::new();
    for spec in &outcome.specs {
        let display = display_path(ctx, &spec.path);
        let errors: Vec<schema::SchemaError> = validate_schema(&spec.data);
        if errors.is_empty() {
            valid_docs.push(SpecDoc {
                path: display,
                data: spec.data.clone(),
            });
        } else {
            document_errors += errors.len();
            for err in errors {
                lines.push(ErrorLine::new("SCHEMA", display.clone(), err.path, err.message));
            }
        }
    }

    let mut set_errors = 0usize;
    for err in run_cross_checks(&valid_docs) {
        set_errors += 1;
        lines.push(ErrorLine::new("CROSS", err.file, err.path, err.message));
    }
    // The inventory is generated from the same documents; with parse or
    // schema errors outstanding it would only repeat them.
    if document_errors == 0 {
        for issue in check_inventory(&ctx.root, &ctx.config)? {
            set_errors += 1;
            lines.push(ErrorLine::new(
                "INVENTORY",
                ctx.config.inventory_file.clone(),
                issue.id,
                issue.message,
            ));
        }
    }

    emit_sorted(lines);

    if args.fix && document_errors == 0 {
        let index = build_skill_index(&ctx.root, &ctx.config)?;
        std::fs::write(ctx.config.index_path(&ctx.root), index.render()?)
            .map_err(|err| SsvError::io("write", &ctx.config.index_path(&ctx.root), &err))?;
        let table = generate_inventory(&ctx.root, &ctx.config)?;
        std::fs::write(ctx.config.inventory_path(&ctx.root), table)
            .map_err(|err| SsvError::io("write", &ctx.config.inventory_path(&ctx.root), &err))?;
        info!("rewrote index and inventory artifacts");
    }

    if document_errors > 0 {
        return Err(SsvError::ValidationFailed(format!(
            "{document_errors} document error(s)"
        )));
    }
    if set_errors > 0 {
        return Err(SsvError::CheckFailed(format!(
            "{set_errors} cross-check error(s)"
        )));
    }
    emit_ok(&format!("{} spec(s) consistent", valid_docs.len()));
    Ok(())
}

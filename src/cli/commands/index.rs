//! ssv index - generate or verify the machine-readable skill index.

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::{Result, SsvError};
use crate::index::build_skill_index;

use super::display_path;

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Output file (defaults to skill-index.json under the root)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Verify the existing artifact instead of writing it
    #[arg(long)]
    pub check: bool,
}

pub fn run(ctx: &AppContext, args: &IndexArgs) -> Result<()> {
    let index = build_skill_index(&ctx.root, &ctx.config)?;
    let rendered = index.render()?;
    let target = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.config.index_path(&ctx.root));
    let display = display_path(ctx, &target);

    if args.check {
        let existing = std::fs::read_to_string(&target).unwrap_or_default();
        if existing != rendered {
            return Err(SsvError::CheckFailed(format!(
                "{display} is out of date (run `ssv index`)"
            )));
        }
        emit_ok(&format!("{display} is up to date"));
        return Ok(());
    }

    std::fs::write(&target, rendered).map_err(|err| SsvError::io("write", &target, &err))?;
    emit_ok(&format!("wrote {display} ({} skills)", index.skills.len()));
    Ok(())
}

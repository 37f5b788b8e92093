//! ssv inventory - generate or verify the markdown skill inventory.

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::{Result, SsvError};
use crate::inventory::generate_inventory;

use super::display_path;

#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Output file (defaults to INVENTORY.md under the root)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Verify the existing artifact instead of writing it
    #[arg(long)]
    pub check: bool,
}

pub fn run(ctx: &AppContext, args: &InventoryArgs) -> Result<()> {
    let rendered = generate_inventory(&ctx.root, &ctx.config)?;
    let target = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.config.inventory_path(&ctx.root));
    let display = display_path(ctx, &target);

    if args.check {
        let existing = std::fs::read_to_string(&target).unwrap_or_default();
        if existing != rendered {
            return Err(SsvError::CheckFailed(format!(
                "{display} is out of date (run `ssv inventory`)"
            )));
        }
        emit_ok(&format!("{display} is up to date"));
        return Ok(());
    }

    std::fs::write(&target, rendered).map_err(|err| SsvError::io("write", &target, &err))?;
    emit_ok(&format!("wrote {display}"));
    Ok(())
}

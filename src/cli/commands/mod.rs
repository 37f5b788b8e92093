//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use std::path::Path;

use clap::Subcommand;

pub mod check;
pub mod index;
pub mod inventory;
pub mod normalize;
pub mod validate;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Check(args) => check::run(ctx, args),
        Commands::Index(args) => index::run(ctx, args),
        Commands::Inventory(args) => inventory::run(ctx, args),
        Commands::Normalize(args) => normalize::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and schema-validate spec files
    Validate(validate::ValidateArgs),

    /// Full pipeline: parse, schema, cross-document and inventory checks
    Check(check::CheckArgs),

    /// Generate (or verify) the machine-readable skill index
    Index(index::IndexArgs),

    /// Generate (or verify) the markdown skill inventory
    Inventory(inventory::InventoryArgs),

    /// Rewrite spec files in canonical JSON form
    Normalize(normalize::NormalizeArgs),
}

/// Root-relative display path with forward slashes, so reports are
/// reproducible across machines.
pub(crate) fn display_path(ctx: &AppContext, path: &Path) -> String {
    let root = std::path::absolute(&ctx.root).unwrap_or_else(|_| ctx.root.clone());
    path.strip_prefix(&root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

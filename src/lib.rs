//! ssv - SkillSpec validator
//!
//! Validates, cross-checks, normalizes, indexes and inventories a
//! repository of SkillSpec documents. The core (parser, schema
//! validator, cross-document checker, generators) performs no I/O of
//! its own; the CLI layer reads files and feeds text or parsed values
//! into it.

pub mod app;
pub mod canon;
pub mod checks;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod index;
pub mod inventory;
pub mod schema;
pub mod yaml;

pub use error::{Result, SsvError};

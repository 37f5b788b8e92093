//! Restricted YAML-subset parser.
//!
//! Parses the deliberately constrained YAML dialect used by SkillSpec
//! documents: block mappings and sequences, `|`/`>` block scalars,
//! quoted and plain scalars. Tabs, flow collections (other than the
//! whole-value `[]`/`{}` literals), anchors and multi-document streams
//! are rejected with line-addressable errors. A general YAML library
//! would accept all of those, which is exactly what this parser exists
//! to prevent.

mod line;
mod parser;
mod value;

pub use line::{LineInfo, index_lines};
pub use parser::parse_yaml;
pub use value::YamlValue;

use thiserror::Error;

/// A parse failure, addressable to one line of the source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{source_name}:{line}: {message}")]
pub struct ParseError {
    /// Name of the source (usually a file path) for error display.
    pub source_name: String,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}

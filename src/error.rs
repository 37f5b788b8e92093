//! Error types for the ssv crate.

use thiserror::Error;

use crate::yaml::ParseError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SsvError>;

/// Top-level error for CLI and library operations.
///
/// Per-document diagnostics (schema and cross-check findings) are not
/// errors in this sense: they are accumulated into lists and reported in
/// bulk. `SsvError` covers the unrecoverable conditions plus the final
/// "this run failed" summaries that drive the process exit code.
#[derive(Debug, Error)]
pub enum SsvError {
    /// Malformed YAML-subset input, addressable to a source line.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Malformed JSON input, message carries `<path>: invalid JSON (...)`.
    #[error("{0}")]
    Json(String),

    /// Filesystem failure with context (path and operation).
    #[error("{0}")]
    Io(String),

    /// Bad configuration or environment.
    #[error("{0}")]
    Config(String),

    /// A spec file violated a fast-fail requirement (non-JSON in a
    /// JSON-only context, missing id/version).
    #[error("{0}")]
    InvalidSpec(String),

    /// One or more parse or schema errors were reported.
    #[error("{0}")]
    ValidationFailed(String),

    /// One or more cross-document or inventory check errors were reported.
    /// Mapped to a distinct exit code so callers can tell "malformed
    /// document" from "inconsistent document set".
    #[error("{0}")]
    CheckFailed(String),

    /// A named skill, file, or artifact does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl SsvError {
    /// Wrap a filesystem error with the path it concerns.
    pub fn io(op: &str, path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io(format!("{op} {}: {err}", path.display()))
    }
}

//! Per-document SkillSpec schema validation.
//!
//! Not a general JSON-Schema engine: the document shape is fixed and
//! explicit, every object level is closed-world (required keys plus a
//! full allowed set), and violations accumulate rather than
//! short-circuiting so one run reports every structural problem.

pub mod formats;
mod validator;

pub use validator::validate_schema;

/// One structural violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// JSONPath-like location, e.g. `$.inputs[0].name`.
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.path, self.message)
    }
}

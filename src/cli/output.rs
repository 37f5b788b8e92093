//! Diagnostic line rendering.
//!
//! Every finding prints as one tagged line, `[TAG] file path message`,
//! sorted by file then path then message so two runs over the same
//! tree diff cleanly. Summary lines may use color; finding lines stay
//! plain.

use colored::Colorize;

/// One printable finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLine {
    pub tag: &'static str,
    pub file: String,
    pub path: String,
    pub message: String,
}

impl ErrorLine {
    pub fn new(tag: &'static str, file: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag,
            file: file.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}] {} {} {}", self.tag, self.file, self.path, self.message)
    }
}

/// Sort and print findings to stdout. Returns the number printed.
pub fn emit_sorted(mut lines: Vec<ErrorLine>) -> usize {
    lines.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.message.cmp(&b.message))
    });
    for line in &lines {
        println!("{}", line.render());
    }
    lines.len()
}

/// Green summary line for a clean run.
pub fn emit_ok(message: &str) {
    println!("{} {message}", "OK".green().bold());
}

//! Line pre-indexing for the restricted parser.
//!
//! The source is split once into [`LineInfo`] records; the block
//! parsers then operate on line indices instead of re-scanning text.

use super::ParseError;

/// One pre-indexed source line.
#[derive(Debug, Clone)]
pub struct LineInfo {
    /// 1-based line number in the source.
    pub number: usize,
    /// Leading-space count. Tabs never reach here; they are a parse error.
    pub indent: usize,
    /// Comment-stripped, trimmed content. Empty for blank/comment lines.
    pub content: String,
    /// The original line, untouched. Block scalar bodies are taken from
    /// here so `#` and quotes inside them survive verbatim.
    pub raw: String,
}

/// Split `text` into indexed lines, stripping comments quote-aware.
///
/// Fails on tab indentation.
pub fn index_lines(text: &str, source_name: &str) -> Result<Vec<LineInfo>, ParseError> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let indent = leading_spaces(raw, source_name, number)?;
        let content = strip_comment(raw).trim().to_string();
        lines.push(LineInfo {
            number,
            indent,
            content,
            raw: raw.to_string(),
        });
    }
    Ok(lines)
}

fn leading_spaces(raw: &str, source_name: &str, number: usize) -> Result<usize, ParseError> {
    let mut count = 0;
    for ch in raw.chars() {
        match ch {
            ' ' => count += 1,
            '\t' => {
                return Err(ParseError::new(
                    source_name,
                    number,
                    "tab indentation is not allowed",
                ));
            }
            _ => break,
        }
    }
    Ok(count)
}

/// Remove a trailing `# comment`, tracking quote state so a `#` inside
/// a balanced single- or double-quoted scalar is kept. An escaped `\"`
/// inside a double-quoted scalar does not toggle quote state, and a
/// doubled `''` stays inside a single-quoted scalar.
///
/// A quote opens a scalar only at a token boundary (line start or after
/// a space); a mid-word `'` or `"` is plain content, so prose like
/// `don't` never engages quote tracking. A scalar left open at end of
/// line is kept intact for the scalar parsers, which report the
/// unterminated quote with the right context.
fn strip_comment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_double {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_double = false;
            }
            out.push(ch);
            prev = Some(ch);
            continue;
        }
        if in_single {
            if ch == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push_str("''");
                    prev = Some('\'');
                    continue;
                }
                in_single = false;
            }
            out.push(ch);
            prev = Some(ch);
            continue;
        }
        match ch {
            '"' if opens_quote(prev) => {
                in_double = true;
                out.push(ch);
            }
            '\'' if opens_quote(prev) => {
                in_single = true;
                out.push(ch);
            }
            '#' => break,
            _ => out.push(ch),
        }
        prev = Some(ch);
    }
    out
}

/// A quote starts a quoted scalar only at a token boundary.
pub(crate) fn opens_quote(prev: Option<char>) -> bool {
    prev.is_none_or(|c| c == ' ')
}

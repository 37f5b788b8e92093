//! Recursive-descent block parsers over pre-indexed lines.
//!
//! The grammar is a small set of mutually-recursive block parsers
//! (mapping / sequence / block scalar) so each rule stays testable in
//! isolation. At a given indent the first non-blank line decides the
//! block kind: a leading `-` means sequence, anything else mapping.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::line::{LineInfo, index_lines, opens_quote};
use super::{ParseError, YamlValue};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("number regex"));

/// Parse a restricted YAML document into a value tree.
///
/// `source_name` is used only for error display (`source:line: message`).
pub fn parse_yaml(text: &str, source_name: &str) -> Result<YamlValue, ParseError> {
    let lines = index_lines(text, source_name)?;
    let mut parser = Parser {
        lines,
        pos: 0,
        source: source_name.to_string(),
    };

    parser.skip_blank();
    let Some(first) = parser.peek() else {
        return Ok(YamlValue::Null);
    };
    let root_indent = first.indent;
    let value = parser.parse_block(root_indent)?;

    parser.skip_blank();
    if let Some(line) = parser.peek() {
        return Err(parser.err(line.number, "trailing content after document root"));
    }
    Ok(value)
}

struct Parser {
    lines: Vec<LineInfo>,
    pos: usize,
    source: String,
}

impl Parser {
    fn err(&self, line: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(&self.source, line, message)
    }

    fn peek(&self) -> Option<&LineInfo> {
        self.lines.get(self.pos)
    }

    /// Advance past blank lines (empty after comment stripping).
    fn skip_blank(&mut self) {
        while self
            .lines
            .get(self.pos)
            .is_some_and(|l| l.content.is_empty())
        {
            self.pos += 1;
        }
    }

    fn parse_block(&mut self, indent: usize) -> Result<YamlValue, ParseError> {
        self.skip_blank();
        let Some(line) = self.peek() else {
            return Ok(YamlValue::Null);
        };
        if is_sequence_item(&line.content) {
            self.parse_sequence(indent)
        } else {
            self.parse_mapping(indent)
        }
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<YamlValue, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.peek() else { break };
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(self.err(line.number, "sequence item misaligned with parent indent"));
            }
            if !is_sequence_item(&line.content) {
                return Err(self.err(
                    line.number,
                    "expected sequence item, found mapping content",
                ));
            }
            items.push(self.parse_sequence_item(indent)?);
        }
        Ok(YamlValue::Sequence(items))
    }

    fn parse_sequence_item(&mut self, indent: usize) -> Result<YamlValue, ParseError> {
        let line = &self.lines[self.pos];
        let number = line.number;
        let remainder = line
            .content
            .strip_prefix('-')
            .unwrap_or_default()
            .trim_start()
            .to_string();

        if remainder.is_empty() {
            // Bare `-`: placeholder whose value is the nested block at
            // deeper indent, or null when nothing follows.
            self.pos += 1;
            self.skip_blank();
            return match self.peek() {
                Some(next) if next.indent > indent => {
                    let child = next.indent;
                    self.parse_block(child)
                }
                _ => Ok(YamlValue::Null),
            };
        }

        if remainder == "|" || remainder == ">" {
            let folded = remainder == ">";
            self.pos += 1;
            return self.parse_block_scalar(folded, indent);
        }

        if split_key(&remainder).is_some() {
            // Inline mapping start: `- key: value`. Re-slot the line as a
            // mapping entry two columns in (past the `- `) and let the
            // mapping parser pick up the remaining entries of this item.
            let entry_indent = indent + 2;
            let line = &mut self.lines[self.pos];
            line.content = remainder;
            line.indent = entry_indent;
            return self.parse_mapping(entry_indent);
        }

        self.pos += 1;
        self.parse_scalar(&remainder, number)
    }

    fn parse_mapping(&mut self, indent: usize) -> Result<YamlValue, ParseError> {
        let mut entries: Vec<(String, YamlValue)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        loop {
            self.skip_blank();
            let Some(line) = self.peek() else { break };
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(self.err(line.number, "bad indentation"));
            }
            if is_sequence_item(&line.content) {
                return Err(self.err(
                    line.number,
                    "expected mapping entry, found sequence item",
                ));
            }

            let number = line.number;
            let content = line.content.clone();
            let Some((raw_key, rest)) = split_key(&content) else {
                return Err(self.err(number, "expected ':' in mapping entry"));
            };
            let key = self.unquote_key(raw_key.trim(), number)?;
            if !seen.insert(key.clone()) {
                return Err(self.err(number, format!("duplicate key '{key}'")));
            }

            self.pos += 1;
            let rest = rest.trim();
            let value = if rest.is_empty() {
                self.skip_blank();
                match self.peek() {
                    Some(next) if next.indent > indent => {
                        let child = next.indent;
                        self.parse_block(child)?
                    }
                    _ => YamlValue::Null,
                }
            } else if rest == "|" || rest == ">" {
                self.parse_block_scalar(rest == ">", indent)?
            } else if rest.starts_with('|') || rest.starts_with('>') {
                return Err(self.err(number, format!("unsupported block scalar marker '{rest}'")));
            } else {
                self.parse_scalar(rest, number)?
            };
            entries.push((key, value));
        }
        Ok(YamlValue::Mapping(entries))
    }

    /// Capture a `|` or `>` block scalar body: every following line that
    /// is blank or indented past `parent_indent`, taken from the raw
    /// (comment-bearing) text.
    fn parse_block_scalar(
        &mut self,
        folded: bool,
        parent_indent: usize,
    ) -> Result<YamlValue, ParseError> {
        let mut captured: Vec<(usize, String)> = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            let blank = line.raw.trim().is_empty();
            if !blank && line.indent <= parent_indent {
                break;
            }
            captured.push((line.number, line.raw.clone()));
            self.pos += 1;
        }

        // Trailing blanks belong to whatever follows the scalar.
        while captured
            .last()
            .is_some_and(|(_, raw)| raw.trim().is_empty())
        {
            captured.pop();
        }

        let Some(body_indent) = captured
            .iter()
            .find(|(_, raw)| !raw.trim().is_empty())
            .map(|(_, raw)| raw.len() - raw.trim_start_matches(' ').len())
        else {
            return Ok(YamlValue::String(String::new()));
        };

        let mut body = Vec::new();
        for (number, raw) in &captured {
            if raw.trim().is_empty() {
                body.push(String::new());
                continue;
            }
            let line_indent = raw.len() - raw.trim_start_matches(' ').len();
            if line_indent < body_indent {
                return Err(self.err(*number, "bad indentation in block scalar"));
            }
            body.push(raw[body_indent..].to_string());
        }

        let text = if folded { fold_lines(&body) } else { literal_lines(&body) };
        Ok(YamlValue::String(text))
    }

    fn unquote_key(&self, raw: &str, number: usize) -> Result<String, ParseError> {
        if raw.starts_with('"') || raw.starts_with('\'') {
            match self.parse_scalar(raw, number)? {
                YamlValue::String(s) => Ok(s),
                other => Err(self.err(number, format!("invalid mapping key: {other:?}"))),
            }
        } else {
            Ok(raw.to_string())
        }
    }

    fn parse_scalar(&self, s: &str, number: usize) -> Result<YamlValue, ParseError> {
        match s {
            "" => return Ok(YamlValue::Null),
            "null" | "~" => return Ok(YamlValue::Null),
            "true" => return Ok(YamlValue::Bool(true)),
            "false" => return Ok(YamlValue::Bool(false)),
            // Whole-value empty-collection literals are the one piece of
            // flow syntax the subset admits.
            "[]" => return Ok(YamlValue::Sequence(Vec::new())),
            "{}" => return Ok(YamlValue::Mapping(Vec::new())),
            _ => {}
        }
        if NUMBER_RE.is_match(s) {
            let n: f64 = s
                .parse()
                .map_err(|_| self.err(number, format!("invalid number '{s}'")))?;
            return Ok(YamlValue::Number(n));
        }
        if s.starts_with('[') || s.starts_with('{') {
            return Err(self.err(number, "flow collections are not supported"));
        }
        if let Some(rest) = s.strip_prefix('"') {
            return self.parse_double_quoted(rest, number);
        }
        if let Some(rest) = s.strip_prefix('\'') {
            return self.parse_single_quoted(rest, number);
        }
        Ok(YamlValue::String(s.to_string()))
    }

    fn parse_double_quoted(&self, rest: &str, number: usize) -> Result<YamlValue, ParseError> {
        let mut out = String::new();
        let mut chars = rest.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(self.err(number, "unterminated quote")),
                },
                '"' => {
                    let trailing: String = chars.collect();
                    if !trailing.trim().is_empty() {
                        return Err(self.err(number, "trailing content after quoted scalar"));
                    }
                    return Ok(YamlValue::String(out));
                }
                _ => out.push(ch),
            }
        }
        Err(self.err(number, "unterminated quote"))
    }

    fn parse_single_quoted(&self, rest: &str, number: usize) -> Result<YamlValue, ParseError> {
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '\'' {
                out.push(ch);
                continue;
            }
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push('\'');
                continue;
            }
            let trailing: String = chars.collect();
            if !trailing.trim().is_empty() {
                return Err(self.err(number, "trailing content after quoted scalar"));
            }
            return Ok(YamlValue::String(out));
        }
        Err(self.err(number, "unterminated quote"))
    }
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Find the key/value split at the first unquoted `:` that is followed
/// by a space or ends the line. Quote tracking matches comment
/// stripping: a quote opens a scalar only at a token boundary, a `''`
/// stays inside a single-quoted scalar, and `: ` inside a quoted key
/// never splits.
fn split_key(content: &str) -> Option<(&str, &str)> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let chars: Vec<(usize, char)> = content.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        let (idx, ch) = chars[i];
        if in_double {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_double = false;
            }
            prev = Some(ch);
            i += 1;
            continue;
        }
        if in_single {
            if ch == '\'' {
                if chars.get(i + 1).map(|&(_, c)| c) == Some('\'') {
                    prev = Some('\'');
                    i += 2;
                    continue;
                }
                in_single = false;
            }
            prev = Some(ch);
            i += 1;
            continue;
        }
        match ch {
            '"' if opens_quote(prev) => in_double = true,
            '\'' if opens_quote(prev) => in_single = true,
            ':' => {
                let next = chars.get(i + 1).map(|&(_, c)| c);
                if next.is_none() || next == Some(' ') {
                    return Some((&content[..idx], &content[idx + 1..]));
                }
            }
            _ => {}
        }
        prev = Some(ch);
        i += 1;
    }
    None
}

fn literal_lines(body: &[String]) -> String {
    if body.is_empty() {
        return String::new();
    }
    let mut text = body.join("\n");
    text.push('\n');
    text
}

/// Folded (`>`) semantics: consecutive non-blank lines join with a
/// single space; a blank line becomes a paragraph break.
fn fold_lines(body: &[String]) -> String {
    if body.is_empty() {
        return String::new();
    }
    let mut text = String::new();
    for line in body {
        if line.is_empty() {
            text.push('\n');
        } else if text.is_empty() || text.ends_with('\n') {
            text.push_str(line);
        } else {
            text.push(' ');
            text.push_str(line);
        }
    }
    text.push('\n');
    text
}

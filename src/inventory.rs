//! Human-readable inventory table generation and lint.
//!
//! The inventory is a derived view, never authoritative: each row
//! merges SkillSpec fields with an optional `SKILL.md` frontmatter
//! block. A separate lint pass re-parses the *rendered* table and
//! cross-references it against what is actually on disk.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::Config;
use crate::discovery;
use crate::error::{Result, SsvError};
use crate::schema::formats;
use crate::yaml::{self, YamlValue};

pub const STATUS_VALUES: &[&str] = &["planned", "experimental", "stable", "deprecated"];
pub const IMPL_VALUES: &[&str] = &["none", "prompt", "code"];

const TABLE_HEADER: &str =
    "| Skill ID | Family | Status | Impl | Version | Policies | Patterns | Outputs |";
const TABLE_SEPARATOR: &str = "| --- | --- | --- | --- | --- | --- | --- | --- |";

/// One rendered inventory row. All cells are display strings; `-`
/// marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub id: String,
    pub family: String,
    pub status: String,
    pub impl_kind: String,
    pub version: String,
    pub policies: String,
    pub patterns: String,
    pub outputs: String,
}

/// One finding from the inventory lint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryIssue {
    /// Skill id of the offending row, or `-` for table-level findings.
    pub id: String,
    pub message: String,
}

impl InventoryIssue {
    fn new(id: &str, message: impl Into<String>) -> Self {
        Self {
            id: if id.is_empty() { "-".to_string() } else { id.to_string() },
            message: message.into(),
        }
    }
}

/// Generate the full inventory markdown document. Byte-for-byte stable
/// given unchanged inputs.
pub fn generate_inventory(root: &Path, config: &Config) -> Result<String> {
    let rows = collect_rows(root, config)?;
    Ok(render_table(&rows))
}

/// Generate the table, then lint the rendered form against disk.
pub fn check_inventory(root: &Path, config: &Config) -> Result<Vec<InventoryIssue>> {
    let markdown = generate_inventory(root, config)?;
    lint_inventory(root, config, &markdown)
}

fn collect_rows(root: &Path, config: &Config) -> Result<Vec<InventoryRow>> {
    let mut rows = Vec::new();
    for path in discovery::find_skill_files(root, config)? {
        let data = discovery::load_spec_file(&path)?;
        rows.push(build_row(&path, &data)?);
    }
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    debug!(rows = rows.len(), "collected inventory rows");
    Ok(rows)
}

fn build_row(spec_path: &Path, data: &Value) -> Result<InventoryRow> {
    let dir = spec_path.parent().unwrap_or(Path::new("."));
    let id = data["id"].as_str().unwrap_or("").trim().to_string();
    let has_code = dir.join("code").is_dir();

    // Spec-derived defaults; frontmatter overrides below.
    let mut row = InventoryRow {
        family: default_family(data, &id),
        status: if has_code { "experimental" } else { "planned" }.to_string(),
        impl_kind: if has_code { "code" } else { "none" }.to_string(),
        version: cell_or_dash(data["version"].as_str()),
        policies: "-".to_string(),
        patterns: "-".to_string(),
        outputs: default_outputs(data),
        id,
    };

    let skill_md = dir.join("SKILL.md");
    if skill_md.is_file() {
        let text = std::fs::read_to_string(&skill_md)
            .map_err(|err| SsvError::io("read", &skill_md, &err))?;
        if let Some(front) = parse_frontmatter(&text, &skill_md.display().to_string())? {
            apply_frontmatter(&mut row, &front);
        }
    }
    Ok(row)
}

fn default_family(data: &Value, id: &str) -> String {
    let tag = data
        .pointer("/metadata/tags/0")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match tag {
        Some(tag) => tag.to_string(),
        None => cell_or_dash(id.split('/').next().filter(|s| !s.is_empty())),
    }
}

fn default_outputs(data: &Value) -> String {
    let names: Vec<&str> = data["outputs"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry["name"].as_str())
                .collect()
        })
        .unwrap_or_default();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

fn cell_or_dash(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "-".to_string(),
    }
}

/// Extract and parse a leading `---` frontmatter block. A file without
/// one (or without a closing fence) contributes nothing.
fn parse_frontmatter(text: &str, source: &str) -> Result<Option<YamlValue>> {
    let mut lines = text.lines();
    if lines.next().map(str::trim) != Some("---") {
        return Ok(None);
    }
    let body: Vec<&str> = lines.by_ref().take_while(|l| l.trim() != "---").collect();
    if text.lines().skip(1).all(|l| l.trim() != "---") {
        return Ok(None);
    }
    let value = yaml::parse_yaml(&body.join("\n"), source)?;
    Ok(Some(value))
}

fn apply_frontmatter(row: &mut InventoryRow, front: &YamlValue) {
    for (key, cell) in [
        ("family", &mut row.family),
        ("status", &mut row.status),
        ("impl", &mut row.impl_kind),
        ("policies", &mut row.policies),
        ("patterns", &mut row.patterns),
        ("outputs", &mut row.outputs),
    ] {
        if let Some(text) = text_cell(front.get(key)) {
            *cell = text;
        }
    }
}

/// A frontmatter field renders as a cell: a plain string as-is, a
/// sequence of strings comma-joined.
fn text_cell(value: Option<&YamlValue>) -> Option<String> {
    match value? {
        YamlValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        YamlValue::Sequence(items) => {
            let joined = items
                .iter()
                .filter_map(YamlValue::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

fn render_table(rows: &[InventoryRow]) -> String {
    let mut out = String::from("# Skill Inventory\n\n");
    out.push_str(TABLE_HEADER);
    out.push('\n');
    out.push_str(TABLE_SEPARATOR);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            cell_or_dash(Some(&row.id)),
            row.family,
            row.status,
            row.impl_kind,
            row.version,
            row.policies,
            row.patterns,
            row.outputs,
        ));
    }
    out
}

/// Parse a rendered inventory table back into rows. Header and
/// separator lines are skipped; short rows are padded with `-`.
#[must_use]
pub fn parse_inventory(markdown: &str) -> Vec<InventoryRow> {
    let mut rows = Vec::new();
    for line in markdown.lines() {
        let line = line.trim();
        if !line.starts_with('|') {
            continue;
        }
        let cells: Vec<String> = line
            .trim_matches('|')
            .split('|')
            .map(|c| c.trim().to_string())
            .collect();
        if cells.first().map(String::as_str) == Some("Skill ID") {
            continue;
        }
        // Separator cells are runs of two or more dashes; a lone `-` is
        // an empty data cell, so an all-dash data row still reaches the
        // lint pass.
        if cells.iter().all(|c| c.len() >= 2 && c.bytes().all(|b| b == b'-')) {
            continue;
        }
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_else(|| "-".to_string());
        rows.push(InventoryRow {
            id: cell(0),
            family: cell(1),
            status: cell(2),
            impl_kind: cell(3),
            version: cell(4),
            policies: cell(5),
            patterns: cell(6),
            outputs: cell(7),
        });
    }
    rows
}

/// Lint a rendered inventory table against the document set on disk.
pub fn lint_inventory(
    root: &Path,
    config: &Config,
    markdown: &str,
) -> Result<Vec<InventoryIssue>> {
    let rows = parse_inventory(markdown);
    let mut issues = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    for row in &rows {
        if row.id == "-" || row.id.is_empty() {
            issues.push(InventoryIssue::new("-", "row is missing a Skill ID"));
            continue;
        }
        if !seen.insert(&row.id) {
            issues.push(InventoryIssue::new(&row.id, "duplicate Skill ID"));
        }
        if !STATUS_VALUES.contains(&row.status.as_str()) {
            issues.push(InventoryIssue::new(
                &row.id,
                format!(
                    "invalid Status '{}' (expected one of: {})",
                    row.status,
                    STATUS_VALUES.join(", ")
                ),
            ));
        }
        if !IMPL_VALUES.contains(&row.impl_kind.as_str()) {
            issues.push(InventoryIssue::new(
                &row.id,
                format!(
                    "invalid Impl '{}' (expected one of: {})",
                    row.impl_kind,
                    IMPL_VALUES.join(", ")
                ),
            ));
        }
        for token in row.policies.split(',').map(str::trim) {
            if !is_valid_policy(token) {
                issues.push(InventoryIssue::new(
                    &row.id,
                    format!("invalid policy '{token}' (expected passive, audit/<id> or -)"),
                ));
            }
        }
        for token in row.patterns.split(',').map(str::trim) {
            if token != "-" && !formats::is_valid_id(token) {
                issues.push(InventoryIssue::new(
                    &row.id,
                    format!("invalid pattern reference '{token}'"),
                ));
            }
        }
    }

    let on_disk = skill_dirs_by_id(root, config)?;
    for row in &rows {
        if row.id == "-" || row.id.is_empty() {
            continue;
        }
        let Some(dir) = on_disk.get(&row.id) else {
            issues.push(InventoryIssue::new(&row.id, "no spec file found on disk"));
            continue;
        };
        if row.impl_kind == "code" && !dir.join("code").is_dir() {
            issues.push(InventoryIssue::new(
                &row.id,
                "Impl is 'code' but no code directory exists",
            ));
        }
        if row.status != "planned" && !dir.join("SKILL.md").is_file() {
            issues.push(InventoryIssue::new(
                &row.id,
                format!("Status is '{}' but SKILL.md is missing", row.status),
            ));
        }
        // Heuristic: anything shipped as runnable code is expected to
        // emit a work-log record somewhere in its files.
        if matches!(row.status.as_str(), "experimental" | "stable")
            && row.impl_kind == "code"
            && !emits_work_log(dir)
        {
            issues.push(InventoryIssue::new(
                &row.id,
                "does not appear to emit a work-log record (no U.Work or log-work token)",
            ));
        }
    }

    let listed: HashSet<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    for id in on_disk.keys() {
        if !listed.contains(id.as_str()) {
            issues.push(InventoryIssue::new(id, "missing from inventory table"));
        }
    }

    Ok(issues)
}

fn is_valid_policy(token: &str) -> bool {
    token == "-"
        || token == "passive"
        || token
            .strip_prefix("audit/")
            .is_some_and(formats::is_valid_id)
}

fn skill_dirs_by_id(root: &Path, config: &Config) -> Result<BTreeMap<String, PathBuf>> {
    let mut dirs = BTreeMap::new();
    for path in discovery::find_skill_files(root, config)? {
        // Unparseable specs are the validate command's problem; the
        // inventory lint only cross-references what it can read.
        let Ok(data) = discovery::load_spec_file(&path) else {
            continue;
        };
        if let Some(id) = data["id"].as_str().map(str::trim).filter(|s| !s.is_empty()) {
            let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            dirs.entry(id.to_string()).or_insert(dir);
        }
    }
    Ok(dirs)
}

fn emits_work_log(dir: &Path) -> bool {
    for entry in WalkDir::new(dir).follow_links(false).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(text) = std::fs::read_to_string(entry.path())
            && (text.contains("U.Work") || text.contains("log-work"))
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn spec_json(id: &str) -> String {
        format!(
            "{{\"id\": \"{id}\", \"version\": \"0.1.0\", \
              \"metadata\": {{\"tags\": [\"util\"]}}, \
              \"outputs\": [{{\"name\": \"report\"}}]}}"
        )
    }

    #[test]
    fn generates_sorted_table_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("skills/b/skill.json"), &spec_json("zed/b"));
        write(&root.join("skills/a/skill.json"), &spec_json("ack/a"));

        let table = generate_inventory(root, &Config::default()).unwrap();
        let rows = parse_inventory(&table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "ack/a");
        assert_eq!(rows[0].family, "util");
        assert_eq!(rows[0].status, "planned");
        assert_eq!(rows[0].impl_kind, "none");
        assert_eq!(rows[0].outputs, "report");
        assert_eq!(rows[1].id, "zed/b");
    }

    #[test]
    fn frontmatter_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        write(
            &root.join("s/SKILL.md"),
            "---\nfamily: ops\nstatus: stable\npolicies:\n  - passive\n  - audit/a/one\n---\n# Doc\n",
        );

        let table = generate_inventory(root, &Config::default()).unwrap();
        let rows = parse_inventory(&table);
        assert_eq!(rows[0].family, "ops");
        assert_eq!(rows[0].status, "stable");
        assert_eq!(rows[0].policies, "passive, audit/a/one");
    }

    #[test]
    fn family_falls_back_to_id_segment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("s/skill.json"),
            "{\"id\": \"ops/thing\", \"version\": \"0.1.0\"}",
        );
        let table = generate_inventory(root, &Config::default()).unwrap();
        let rows = parse_inventory(&table);
        assert_eq!(rows[0].family, "ops");
        assert_eq!(rows[0].outputs, "-");
    }

    #[test]
    fn generation_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        let config = Config::default();
        let first = generate_inventory(root, &config).unwrap();
        let second = generate_inventory(root, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn lint_accepts_generated_table_for_planned_skills() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        let issues = check_inventory(root, &Config::default()).unwrap();
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn lint_flags_bad_enums_and_unknown_rows() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        let markdown = "\
# Skill Inventory

| Skill ID | Family | Status | Impl | Version | Policies | Patterns | Outputs |
| --- | --- | --- | --- | --- | --- | --- | --- |
| a/one | util | shipping | none | 0.1.0 | - | - | report |
| ghost | util | planned | wasm | 0.1.0 | active | Bad_Token | - |
";
        let issues = lint_inventory(root, &Config::default(), markdown).unwrap();
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("invalid Status 'shipping'")));
        assert!(messages.iter().any(|m| m.contains("invalid Impl 'wasm'")));
        assert!(messages.iter().any(|m| m.contains("invalid policy 'active'")));
        assert!(messages.iter().any(|m| m.contains("invalid pattern reference 'Bad_Token'")));
        assert!(messages.iter().any(|m| m.contains("no spec file found on disk")));
    }

    #[test]
    fn lint_flags_all_dash_rows_as_missing_id() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        let markdown = "\
| Skill ID | Family | Status | Impl | Version | Policies | Patterns | Outputs |
| --- | --- | --- | --- | --- | --- | --- | --- |
| a/one | util | planned | none | 0.1.0 | - | - | report |
| - | - | - | - | - | - | - | - |
";
        let issues = lint_inventory(root, &Config::default(), markdown).unwrap();
        assert_eq!(issues.len(), 1, "issues: {issues:?}");
        assert_eq!(issues[0].message, "row is missing a Skill ID");
    }

    #[test]
    fn lint_flags_duplicate_and_missing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        let markdown = "\
| Skill ID | Family | Status | Impl | Version | Policies | Patterns | Outputs |
| --- | --- | --- | --- | --- | --- | --- | --- |
| b/two | util | planned | none | 0.1.0 | - | - | - |
| b/two | util | planned | none | 0.1.0 | - | - | - |
";
        let issues = lint_inventory(root, &Config::default(), markdown).unwrap();
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert!(messages.contains(&"duplicate Skill ID"));
        assert!(messages.contains(&"missing from inventory table"));
    }

    #[test]
    fn lint_requires_work_log_token_for_shipped_code() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("s/skill.json"), &spec_json("a/one"));
        write(&root.join("s/SKILL.md"), "---\nstatus: stable\nimpl: code\n---\n");
        fs::create_dir_all(root.join("s/code")).unwrap();
        write(&root.join("s/code/run.sh"), "echo hi\n");

        let issues = check_inventory(root, &Config::default()).unwrap();
        assert!(issues
            .iter()
            .any(|i| i.message.contains("work-log")), "issues: {issues:?}");

        // Adding the token clears the finding.
        write(&root.join("s/code/run.sh"), "echo hi\nssv log-work done\n");
        let issues = check_inventory(root, &Config::default()).unwrap();
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }
}

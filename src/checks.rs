//! Cross-document consistency checks.
//!
//! Runs only over documents that already passed schema validation, so
//! a malformed document never corrupts the results for valid ones. The
//! six checks are independent and all accumulate; none aborts the run.

use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;
use serde_json::Value;

use crate::schema::formats;

/// One schema-valid document plus the path it was loaded from.
#[derive(Debug, Clone)]
pub struct SpecDoc {
    pub path: String,
    pub data: Value,
}

/// One set-level violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCheckError {
    pub file: String,
    pub path: String,
    pub message: String,
}

impl CrossCheckError {
    fn new(file: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CrossCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.file, self.path, self.message)
    }
}

/// Run every cross-document check over the valid document set.
#[must_use]
pub fn run_cross_checks(docs: &[SpecDoc]) -> Vec<CrossCheckError> {
    let mut errors = Vec::new();

    check_duplicate_ids(docs, &mut errors);

    let known_ids: HashSet<&str> = docs
        .iter()
        .filter_map(|d| d.data["id"].as_str())
        .collect();

    for doc in docs {
        check_duplicate_step_ids(doc, &mut errors);
        check_tests_not_empty(doc, &mut errors);
        check_metadata_ordering(doc, &mut errors);
        check_dependency_refs(doc, &known_ids, &mut errors);
        sweep_empty_strings(doc, &mut errors);
    }
    errors
}

/// Check 1: every document sharing an `id` gets one error naming the
/// sibling files.
fn check_duplicate_ids(docs: &[SpecDoc], errors: &mut Vec<CrossCheckError>) {
    let mut by_id: BTreeMap<&str, Vec<&SpecDoc>> = BTreeMap::new();
    for doc in docs {
        if let Some(id) = doc.data["id"].as_str() {
            by_id.entry(id).or_default().push(doc);
        }
    }
    for (id, group) in &by_id {
        if group.len() < 2 {
            continue;
        }
        for doc in group {
            let siblings = group
                .iter()
                .filter(|other| other.path != doc.path)
                .map(|other| other.path.as_str())
                .join(", ");
            errors.push(CrossCheckError::new(
                &doc.path,
                "$.id",
                format!("duplicate id '{id}' (also declared in {siblings})"),
            ));
        }
    }
}

/// Check 2: `step_id` unique within one document's procedure; a repeat
/// names the first occurrence.
fn check_duplicate_step_ids(doc: &SpecDoc, errors: &mut Vec<CrossCheckError>) {
    let Some(steps) = doc.data["procedure"].as_array() else {
        return;
    };
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, step) in steps.iter().enumerate() {
        let Some(step_id) = step["step_id"].as_str() else {
            continue;
        };
        match first_seen.get(step_id) {
            Some(first) => errors.push(CrossCheckError::new(
                &doc.path,
                format!("$.procedure[{i}].step_id"),
                format!("duplicate step_id '{step_id}' (first used at $.procedure[{first}])"),
            )),
            None => {
                first_seen.insert(step_id, i);
            }
        }
    }
}

/// Check 3: `eval.tests` must not be empty.
fn check_tests_not_empty(doc: &SpecDoc, errors: &mut Vec<CrossCheckError>) {
    if let Some(tests) = doc.data.pointer("/eval/tests").and_then(Value::as_array)
        && tests.is_empty()
    {
        errors.push(CrossCheckError::new(
            &doc.path,
            "$.eval.tests",
            "must contain at least one test",
        ));
    }
}

/// Check 4: `metadata.updated >= metadata.created`. Skipped silently
/// when either fails date-format validation; format is the schema
/// validator's job.
fn check_metadata_ordering(doc: &SpecDoc, errors: &mut Vec<CrossCheckError>) {
    let created = doc
        .data
        .pointer("/metadata/created")
        .and_then(Value::as_str)
        .and_then(formats::parse_date);
    let updated = doc
        .data
        .pointer("/metadata/updated")
        .and_then(Value::as_str)
        .and_then(formats::parse_date);
    if let (Some(created), Some(updated)) = (created, updated)
        && updated < created
    {
        errors.push(CrossCheckError::new(
            &doc.path,
            "$.metadata.updated",
            "must be on or after metadata.created",
        ));
    }
}

/// Check 5: each `dependencies.skills` entry splits on the last `@`
/// into a known id and a syntactically valid range.
fn check_dependency_refs(
    doc: &SpecDoc,
    known_ids: &HashSet<&str>,
    errors: &mut Vec<CrossCheckError>,
) {
    let Some(skills) = doc.data.pointer("/dependencies/skills").and_then(Value::as_array) else {
        return;
    };
    for (i, entry) in skills.iter().enumerate() {
        let Some(reference) = entry.as_str() else {
            continue;
        };
        let path = format!("$.dependencies.skills[{i}]");
        let Some((dep_id, range)) = formats::split_dependency(reference) else {
            errors.push(CrossCheckError::new(
                &doc.path,
                path,
                format!("invalid dependency '{reference}' (expected id@range)"),
            ));
            continue;
        };
        if !formats::is_valid_id(dep_id) {
            errors.push(CrossCheckError::new(
                &doc.path,
                path.clone(),
                format!("invalid skill id '{dep_id}'"),
            ));
        } else if !known_ids.contains(dep_id) {
            errors.push(CrossCheckError::new(
                &doc.path,
                path.clone(),
                format!("unknown skill id '{dep_id}'"),
            ));
        }
        if !formats::is_valid_range(range) {
            errors.push(CrossCheckError::new(
                &doc.path,
                path,
                format!("invalid version range '{range}'"),
            ));
        }
    }
}

/// Check 6: schema validation checks types only; this sweep re-walks
/// every declared string and array-of-strings field for empty or
/// whitespace-only content.
fn sweep_empty_strings(doc: &SpecDoc, errors: &mut Vec<CrossCheckError>) {
    let data = &doc.data;

    sweep_str(doc, data.get("name"), "$.name", errors);
    sweep_str(doc, data.get("summary"), "$.summary", errors);
    sweep_str(doc, data.pointer("/intent/goal"), "$.intent.goal", errors);
    sweep_list(doc, data.pointer("/intent/non_goals"), "$.intent.non_goals", errors);

    for key in ["inputs", "outputs"] {
        if let Some(entries) = data[key].as_array() {
            for (i, entry) in entries.iter().enumerate() {
                for field in ["name", "type", "description"] {
                    sweep_str(doc, entry.get(field), &format!("$.{key}[{i}].{field}"), errors);
                }
                sweep_list(doc, entry.get("examples"), &format!("$.{key}[{i}].examples"), errors);
            }
        }
    }

    if let Some(steps) = data["procedure"].as_array() {
        for (i, step) in steps.iter().enumerate() {
            sweep_str(doc, step.get("step_id"), &format!("$.procedure[{i}].step_id"), errors);
            sweep_str(
                doc,
                step.get("instruction"),
                &format!("$.procedure[{i}].instruction"),
                errors,
            );
            sweep_list(doc, step.get("checks"), &format!("$.procedure[{i}].checks"), errors);
        }
    }

    for key in ["safety", "privacy", "licensing"] {
        sweep_list(
            doc,
            data.pointer(&format!("/constraints/{key}")),
            &format!("$.constraints.{key}"),
            errors,
        );
    }
    for key in ["tools", "skills"] {
        sweep_list(
            doc,
            data.pointer(&format!("/dependencies/{key}")),
            &format!("$.dependencies.{key}"),
            errors,
        );
    }

    sweep_list(
        doc,
        data.pointer("/eval/acceptance_criteria"),
        "$.eval.acceptance_criteria",
        errors,
    );
    if let Some(tests) = data.pointer("/eval/tests").and_then(Value::as_array) {
        for (i, test) in tests.iter().enumerate() {
            for field in ["name", "input_fixture", "expected", "notes"] {
                sweep_str(doc, test.get(field), &format!("$.eval.tests[{i}].{field}"), errors);
            }
        }
    }

    sweep_list(doc, data.pointer("/metadata/tags"), "$.metadata.tags", errors);
    sweep_list(doc, data.pointer("/metadata/authors"), "$.metadata.authors", errors);
    sweep_list(doc, data.get("failure_modes"), "$.failure_modes", errors);
    sweep_str(doc, data.pointer("/provenance/model"), "$.provenance.model", errors);
    sweep_str(doc, data.pointer("/provenance/notes"), "$.provenance.notes", errors);
}

fn sweep_str(
    doc: &SpecDoc,
    value: Option<&Value>,
    path: &str,
    errors: &mut Vec<CrossCheckError>,
) {
    if let Some(Value::String(s)) = value
        && s.trim().is_empty()
    {
        errors.push(CrossCheckError::new(&doc.path, path, "must not be empty"));
    }
}

fn sweep_list(
    doc: &SpecDoc,
    value: Option<&Value>,
    path: &str,
    errors: &mut Vec<CrossCheckError>,
) {
    if let Some(Value::Array(items)) = value {
        for (i, item) in items.iter().enumerate() {
            sweep_str(doc, Some(item), &format!("{path}[{i}]"), errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(path: &str, data: Value) -> SpecDoc {
        SpecDoc {
            path: path.to_string(),
            data,
        }
    }

    fn minimal(id: &str) -> Value {
        json!({
            "schema_version": "0.1.0",
            "id": id,
            "name": "n",
            "summary": "s",
            "intent": {"goal": "g", "non_goals": []},
            "inputs": [],
            "outputs": [],
            "procedure": [{"step_id": "s1", "instruction": "do it"}],
            "constraints": {"safety": [], "privacy": [], "licensing": []},
            "dependencies": {"tools": [], "skills": []},
            "eval": {
                "acceptance_criteria": ["works"],
                "tests": [{"name": "t", "input_fixture": "f", "expected": "e"}]
            },
            "version": "0.1.0",
            "metadata": {"tags": ["t"], "authors": ["a"],
                          "created": "2026-01-01", "updated": "2026-01-01"}
        })
    }

    #[test]
    fn clean_set_has_no_errors() {
        let docs = vec![doc("a.json", minimal("a/one")), doc("b.json", minimal("a/two"))];
        assert_eq!(run_cross_checks(&docs), vec![]);
    }

    #[test]
    fn duplicate_ids_name_sibling_files() {
        let docs = vec![doc("x.json", minimal("a/b")), doc("y.json", minimal("a/b"))];
        let errors = run_cross_checks(&docs);
        assert_eq!(errors.len(), 2);
        let for_x = errors.iter().find(|e| e.file == "x.json").unwrap();
        assert_eq!(for_x.path, "$.id");
        assert!(for_x.message.contains("duplicate id 'a/b'"));
        assert!(for_x.message.contains("y.json"));
        let for_y = errors.iter().find(|e| e.file == "y.json").unwrap();
        assert!(for_y.message.contains("x.json"));
    }

    #[test]
    fn duplicate_step_ids_reference_first_index() {
        let mut data = minimal("a/one");
        data["procedure"] = json!([
            {"step_id": "s1", "instruction": "first"},
            {"step_id": "s2", "instruction": "second"},
            {"step_id": "s1", "instruction": "again"}
        ]);
        let errors = run_cross_checks(&[doc("a.json", data)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.procedure[2].step_id");
        assert!(errors[0].message.contains("first used at $.procedure[0]"));
    }

    #[test]
    fn empty_tests_rejected() {
        let mut data = minimal("a/one");
        data["eval"]["tests"] = json!([]);
        let errors = run_cross_checks(&[doc("a.json", data)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.eval.tests");
        assert!(errors[0].message.contains("at least one test"));
    }

    #[test]
    fn updated_before_created_rejected() {
        let mut data = minimal("a/one");
        data["metadata"]["created"] = json!("2026-01-02");
        data["metadata"]["updated"] = json!("2026-01-01");
        let errors = run_cross_checks(&[doc("a.json", data)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.metadata.updated");
        assert!(errors[0].message.contains("must be on or after metadata.created"));
    }

    #[test]
    fn bad_date_format_skips_ordering_check() {
        let mut data = minimal("a/one");
        data["metadata"]["created"] = json!("not-a-date");
        data["metadata"]["updated"] = json!("2026-01-01");
        assert_eq!(run_cross_checks(&[doc("a.json", data)]), vec![]);
    }

    #[test]
    fn unknown_dependency_id() {
        let mut data = minimal("a/one");
        data["dependencies"]["skills"] = json!(["missing-id@^1.0.0"]);
        let errors = run_cross_checks(&[doc("a.json", data)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.dependencies.skills[0]");
        assert_eq!(errors[0].message, "unknown skill id 'missing-id'");
    }

    #[test]
    fn invalid_dependency_range() {
        let docs = vec![doc("one.json", minimal("real-id")), {
            let mut data = minimal("a/two");
            data["dependencies"]["skills"] = json!(["real-id@not-a-range"]);
            doc("two.json", data)
        }];
        let errors = run_cross_checks(&docs);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("invalid version range 'not-a-range'"));
    }

    #[test]
    fn dependency_without_at_rejected() {
        let mut data = minimal("a/one");
        data["dependencies"]["skills"] = json!(["just-an-id"]);
        let errors = run_cross_checks(&[doc("a.json", data)]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("expected id@range"));
    }

    #[test]
    fn multi_token_range_accepted() {
        let mut two = minimal("a/two");
        two["dependencies"]["skills"] = json!(["a/one@>=0.1.0 <0.2.0"]);
        let docs = vec![doc("one.json", minimal("a/one")), doc("two.json", two)];
        assert_eq!(run_cross_checks(&docs), vec![]);
    }

    #[test]
    fn empty_string_sweep() {
        let mut data = minimal("a/one");
        data["summary"] = json!("   ");
        data["metadata"]["tags"] = json!(["ok", ""]);
        data["procedure"][0]["instruction"] = json!("");
        let errors = run_cross_checks(&[doc("a.json", data)]);
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"$.summary"));
        assert!(paths.contains(&"$.metadata.tags[1]"));
        assert!(paths.contains(&"$.procedure[0].instruction"));
        assert_eq!(errors.len(), 3);
    }

    // The end-to-end scenario: a/one valid with no dependencies, a/two
    // depending on a/one. Removing a/one breaks exactly the reference.
    #[test]
    fn dependency_resolution_end_to_end() {
        let one = doc("skills/a/one/skill.json", minimal("a/one"));
        let mut two_data = minimal("a/two");
        two_data["dependencies"]["skills"] = json!(["a/one@^0.1.0"]);
        let two = doc("skills/a/two/skill.json", two_data);

        assert_eq!(run_cross_checks(&[one, two.clone()]), vec![]);

        let errors = run_cross_checks(&[two]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "unknown skill id 'a/one'");
    }
}

//! The fixed SkillSpec shape, walked field by field.
//!
//! Errors accumulate in an explicit `Vec<SchemaError>` threaded through
//! every helper; nothing here throws or stops early, so one run reports
//! every violation in the document.

use serde_json::{Map, Value};

use super::SchemaError;
use super::formats;

const ROOT_REQUIRED: &[&str] = &[
    "schema_version",
    "id",
    "name",
    "summary",
    "intent",
    "inputs",
    "outputs",
    "procedure",
    "constraints",
    "dependencies",
    "eval",
    "version",
    "metadata",
];

const ROOT_ALLOWED: &[&str] = &[
    "schema_version",
    "id",
    "name",
    "summary",
    "intent",
    "inputs",
    "outputs",
    "procedure",
    "constraints",
    "dependencies",
    "eval",
    "version",
    "metadata",
    "failure_modes",
    "quality",
    "provenance",
];

const SOURCE_TYPES: &[&str] = &["manual", "compiled", "imported"];

/// Validate one document against the SkillSpec shape.
///
/// Returns an empty vector for a conformant document, otherwise one
/// error per violation. Referential rules that need the whole document
/// set (duplicate ids, dependency resolution) are the cross-document
/// checker's job.
#[must_use]
pub fn validate_schema(data: &Value) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let Some(root) = expect_object(data, "$", &mut errors) else {
        return errors;
    };
    check_keys(root, "$", ROOT_REQUIRED, ROOT_ALLOWED, &mut errors);

    if let Some(version) = field_string(root, "$", "schema_version", &mut errors)
        && version != "0.1.0"
    {
        errors.push(SchemaError::new(
            "$.schema_version",
            "must be \"0.1.0\"",
        ));
    }

    if let Some(id) = field_string(root, "$", "id", &mut errors)
        && !formats::is_valid_id(id)
    {
        errors.push(SchemaError::new(
            "$.id",
            "invalid id (expected kebab-case segments separated by '/')",
        ));
    }

    field_string(root, "$", "name", &mut errors);
    field_string(root, "$", "summary", &mut errors);

    if let Some(intent) = root.get("intent") {
        validate_intent(intent, &mut errors);
    }
    if let Some(inputs) = root.get("inputs") {
        validate_io_list(inputs, "$.inputs", &mut errors);
    }
    if let Some(outputs) = root.get("outputs") {
        validate_io_list(outputs, "$.outputs", &mut errors);
    }
    if let Some(procedure) = root.get("procedure") {
        validate_procedure(procedure, &mut errors);
    }
    if let Some(constraints) = root.get("constraints") {
        validate_constraints(constraints, &mut errors);
    }
    if let Some(dependencies) = root.get("dependencies") {
        validate_dependencies(dependencies, &mut errors);
    }
    if let Some(eval) = root.get("eval") {
        validate_eval(eval, &mut errors);
    }

    if let Some(version) = field_string(root, "$", "version", &mut errors)
        && !formats::is_valid_semver(version)
    {
        errors.push(SchemaError::new(
            "$.version",
            "invalid semver version (expected major.minor.patch)",
        ));
    }

    if let Some(metadata) = root.get("metadata") {
        validate_metadata(metadata, &mut errors);
    }
    if let Some(failure_modes) = root.get("failure_modes") {
        string_list(failure_modes, "$.failure_modes", &mut errors);
    }
    if let Some(quality) = root.get("quality") {
        validate_quality(quality, &mut errors);
    }
    if let Some(provenance) = root.get("provenance") {
        validate_provenance(provenance, &mut errors);
    }

    errors
}

fn validate_intent(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.intent";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    let keys = &["goal", "non_goals"];
    check_keys(obj, path, keys, keys, errors);
    field_string(obj, path, "goal", errors);
    if let Some(non_goals) = obj.get("non_goals") {
        string_list(non_goals, &format!("{path}.non_goals"), errors);
    }
}

fn validate_io_list(value: &Value, path: &str, errors: &mut Vec<SchemaError>) {
    let Some(items) = expect_array(value, path, errors) else {
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{i}]");
        let Some(obj) = expect_object(item, &item_path, errors) else {
            continue;
        };
        check_keys(
            obj,
            &item_path,
            &["name", "type", "description"],
            &["name", "type", "description", "required", "examples"],
            errors,
        );
        field_string(obj, &item_path, "name", errors);
        field_string(obj, &item_path, "type", errors);
        field_string(obj, &item_path, "description", errors);
        if let Some(required) = obj.get("required")
            && !required.is_boolean()
        {
            errors.push(SchemaError::new(
                format!("{item_path}.required"),
                "expected boolean",
            ));
        }
        if let Some(examples) = obj.get("examples") {
            string_list(examples, &format!("{item_path}.examples"), errors);
        }
    }
}

fn validate_procedure(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.procedure";
    let Some(items) = expect_array(value, path, errors) else {
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{i}]");
        let Some(obj) = expect_object(item, &item_path, errors) else {
            continue;
        };
        check_keys(
            obj,
            &item_path,
            &["step_id", "instruction"],
            &["step_id", "instruction", "checks"],
            errors,
        );
        field_string(obj, &item_path, "step_id", errors);
        field_string(obj, &item_path, "instruction", errors);
        if let Some(checks) = obj.get("checks") {
            string_list(checks, &format!("{item_path}.checks"), errors);
        }
    }
}

fn validate_constraints(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.constraints";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    let keys = &["safety", "privacy", "licensing"];
    check_keys(obj, path, keys, keys, errors);
    for key in keys {
        if let Some(list) = obj.get(*key) {
            string_list(list, &format!("{path}.{key}"), errors);
        }
    }
}

fn validate_dependencies(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.dependencies";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    let keys = &["tools", "skills"];
    check_keys(obj, path, keys, keys, errors);
    for key in keys {
        if let Some(list) = obj.get(*key) {
            string_list(list, &format!("{path}.{key}"), errors);
        }
    }
}

fn validate_eval(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.eval";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    let keys = &["acceptance_criteria", "tests"];
    check_keys(obj, path, keys, keys, errors);
    if let Some(criteria) = obj.get("acceptance_criteria") {
        string_list(criteria, "$.eval.acceptance_criteria", errors);
    }
    if let Some(tests) = obj.get("tests") {
        let tests_path = "$.eval.tests";
        if let Some(items) = expect_array(tests, tests_path, errors) {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{tests_path}[{i}]");
                let Some(test) = expect_object(item, &item_path, errors) else {
                    continue;
                };
                check_keys(
                    test,
                    &item_path,
                    &["name", "input_fixture", "expected"],
                    &["name", "input_fixture", "expected", "notes"],
                    errors,
                );
                field_string(test, &item_path, "name", errors);
                field_string(test, &item_path, "input_fixture", errors);
                field_string(test, &item_path, "expected", errors);
                field_string(test, &item_path, "notes", errors);
            }
        }
    }
}

fn validate_metadata(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.metadata";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    let keys = &["tags", "authors", "created", "updated"];
    check_keys(obj, path, keys, keys, errors);
    if let Some(tags) = obj.get("tags") {
        string_list(tags, "$.metadata.tags", errors);
    }
    if let Some(authors) = obj.get("authors") {
        string_list(authors, "$.metadata.authors", errors);
    }
    for key in ["created", "updated"] {
        if let Some(date) = field_string(obj, path, key, errors)
            && !formats::is_valid_date(date)
        {
            errors.push(SchemaError::new(
                format!("{path}.{key}"),
                "invalid date (expected calendar-valid YYYY-MM-DD)",
            ));
        }
    }
}

/// `quality` is the schema's documented extension point: any key is
/// accepted as long as it ends in `_priority` and holds a number in
/// `[0, 1]`.
fn validate_quality(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.quality";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    for (key, entry) in obj {
        let key_path = format!("{path}.{key}");
        if !key.ends_with("_priority") {
            errors.push(SchemaError::new(key_path, "unknown property"));
            continue;
        }
        match entry.as_f64() {
            Some(n) if (0.0..=1.0).contains(&n) => {}
            Some(_) => errors.push(SchemaError::new(key_path, "must be within [0, 1]")),
            None => errors.push(SchemaError::new(key_path, "expected number")),
        }
    }
}

fn validate_provenance(value: &Value, errors: &mut Vec<SchemaError>) {
    let path = "$.provenance";
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    check_keys(
        obj,
        path,
        &["source_type"],
        &["source_type", "compiled_at", "model", "notes"],
        errors,
    );
    if let Some(source_type) = field_string(obj, path, "source_type", errors)
        && !SOURCE_TYPES.contains(&source_type)
    {
        errors.push(SchemaError::new(
            format!("{path}.source_type"),
            format!("must be one of: {}", SOURCE_TYPES.join(", ")),
        ));
    }
    if let Some(compiled_at) = field_string(obj, path, "compiled_at", errors)
        && !formats::is_valid_datetime(compiled_at)
    {
        errors.push(SchemaError::new(
            format!("{path}.compiled_at"),
            "invalid date-time (expected ISO-8601 with Z or ±HH:MM offset)",
        ));
    }
    field_string(obj, path, "model", errors);
    field_string(obj, path, "notes", errors);
}

/// Missing required keys and unknown keys, symmetric per object level.
fn check_keys(
    obj: &Map<String, Value>,
    path: &str,
    required: &[&str],
    allowed: &[&str],
    errors: &mut Vec<SchemaError>,
) {
    for key in required {
        if !obj.contains_key(*key) {
            errors.push(SchemaError::new(
                format!("{path}.{key}"),
                "missing required property",
            ));
        }
    }
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(SchemaError::new(
                format!("{path}.{key}"),
                "unknown property",
            ));
        }
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<SchemaError>,
) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(obj) => Some(obj),
        None => {
            errors.push(SchemaError::new(path, "expected object"));
            None
        }
    }
}

fn expect_array<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<SchemaError>,
) -> Option<&'a Vec<Value>> {
    match value.as_array() {
        Some(items) => Some(items),
        None => {
            errors.push(SchemaError::new(path, "expected array"));
            None
        }
    }
}

/// Fetch an optional string field, reporting a type error when the key
/// is present but not a string. Missing keys are `check_keys`' concern.
fn field_string<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    errors: &mut Vec<SchemaError>,
) -> Option<&'a str> {
    let value = obj.get(key)?;
    match value.as_str() {
        Some(s) => Some(s),
        None => {
            errors.push(SchemaError::new(
                format!("{path}.{key}"),
                "expected string",
            ));
            None
        }
    }
}

fn string_list(value: &Value, path: &str, errors: &mut Vec<SchemaError>) {
    let Some(items) = expect_array(value, path, errors) else {
        return;
    };
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            errors.push(SchemaError::new(format!("{path}[{i}]"), "expected string"));
        }
    }
}

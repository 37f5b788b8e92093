//! Property tests for the parser and the canonical serializer.

use proptest::prelude::*;
use serde_json::Value;

use ssv::canon::{sort_keys, stable_stringify};
use ssv::yaml::parse_yaml;

/// Arbitrary JSON values, a few levels deep.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn parser_never_panics(input in "\\PC{0,200}") {
        let _ = parse_yaml(&input, "prop");
    }

    #[test]
    fn parser_never_panics_on_structured_lines(
        lines in prop::collection::vec("[ a-z:#'\"|>-]{0,24}", 0..12)
    ) {
        let _ = parse_yaml(&lines.join("\n"), "prop");
    }

    #[test]
    fn sort_keys_is_idempotent(value in json_value()) {
        let once = sort_keys(&value);
        prop_assert_eq!(sort_keys(&once), once);
    }

    #[test]
    fn canonical_form_is_a_fixed_point(value in json_value()) {
        let rendered = stable_stringify(&sort_keys(&value));
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        prop_assert_eq!(stable_stringify(&sort_keys(&reparsed)), rendered);
    }

    #[test]
    fn canonical_form_ends_with_newline(value in json_value()) {
        prop_assert!(stable_stringify(&sort_keys(&value)).ends_with('\n'));
    }

    #[test]
    fn parsed_yaml_scalars_round_trip_as_strings(s in "[a-zA-Z]{1,8} [a-zA-Z]{1,8}") {
        let doc = format!("key: {s}\n");
        let value = parse_yaml(&doc, "prop").unwrap();
        prop_assert_eq!(value.get("key").and_then(|v| v.as_str()), Some(s.as_str()));
    }
}

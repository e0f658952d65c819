//! Integration tests for the layout model.

use layout_model::text::{contains_index_marker, replace_first_index_marker};
use layout_model::{DataModelPath, Layout, LayoutSet, PropertyValue, flatten_object};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn parses_a_layout_file_with_expressions() {
    let file = json!({
        "$schema": "layout.schema.v1.json",
        "data": {
            "layout": [
                { "id": "intro", "type": "Paragraph", "textResourceBindings": { "title": "intro.title" } },
                { "id": "people", "type": "Group", "maxCount": 10, "children": ["name"],
                  "dataModelBindings": { "group": "People" },
                  "hidden": ["equals", ["dataModel", "Flags.HidePeople"], true] },
                { "id": "name", "type": "Input", "required": true,
                  "dataModelBindings": { "simpleBinding": "People.Name" } }
            ]
        }
    });
    let layout: Layout = serde_json::from_value(file).unwrap();

    assert_eq!(layout.len(), 3);
    let people = layout.get("people").unwrap();
    assert!(people.is_repeating_group());
    assert!(people.hidden.as_ref().is_some_and(PropertyValue::is_expression));
    assert_eq!(
        layout.top_level().iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        vec!["intro", "people"]
    );
    assert!(layout.has_required_fields());

    let set = LayoutSet::new().with_page("main", layout);
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["main"]);
}

#[test]
fn malformed_expressions_fail_at_parse_time() {
    let result = Layout::from_json(&json!([
        { "id": "a", "type": "Input", "readOnly": ["equals", 1] }
    ]));
    assert!(result.is_err());
}

#[test]
fn flattened_records_parse_as_paths() {
    let record = flatten_object(&json!({
        "People": [
            { "Name": "Kari", "Pets": [{ "Kind": "cat" }] },
            { "Name": "Ola", "Tags": ["a", "b"] }
        ]
    }));
    let keys: Vec<_> = record.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["People[0].Name", "People[0].Pets[0].Kind", "People[1].Name", "People[1].Tags"]
    );
    for key in record.keys() {
        assert!(DataModelPath::parse(key).is_ok(), "{key} should parse");
    }
}

#[test]
fn markers_are_detected_and_replaced() {
    assert!(contains_index_marker("People[{0}].Name"));
    assert!(!contains_index_marker("People[0].Name"));
    assert_eq!(replace_first_index_marker("People[{0}].Name", 4), "People[4].Name");
}

proptest! {
    #[test]
    fn display_round_trips_through_parse(
        segments in prop::collection::vec(("[A-Za-z][A-Za-z0-9_]{0,8}", prop::option::of(0usize..500)), 1..6)
    ) {
        let raw = segments
            .iter()
            .map(|(name, index)| match index {
                Some(index) => format!("{name}[{index}]"),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(".");
        let path = DataModelPath::parse(&raw).unwrap();
        prop_assert_eq!(path.len(), segments.len());
        prop_assert_eq!(path.to_string(), raw);
    }
}

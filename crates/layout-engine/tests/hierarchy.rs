//! Tests for building node trees from flat layouts.

mod common;

use common::{build, ids, layout, nested_layout, nested_record, record};
use layout_engine::{
    BuildOptions, BuildWarning, EngineError, HierarchyBuilder, RepeatingGroup, RepeatingGroups,
    has_required_fields, rewrite_text_resource_bindings, top_level_components,
};
use layout_model::{PropertyValue, TextResource, TextResourceVariable, TextResources};
use serde_json::json;

#[test]
fn expands_rows_in_depth_first_order() {
    let page = build(&nested_layout(), &nested_record());
    assert_eq!(
        ids(&page.flat(true)),
        vec![
            "top1", "top2", "Group1", "field1-0", "Group2-0", "container-0", "field3-0", "field1-1",
            "Group2-1", "field2-1-0", "field2b-1-0", "container-1", "field3-1", "panel", "panelField",
        ]
    );
    assert_eq!(
        ids(&page.flat(false)),
        vec![
            "top1", "top2", "field1-0", "field3-0", "field1-1", "field2-1-0", "field2b-1-0",
            "field3-1", "panelField",
        ]
    );
}

#[test]
fn row_clones_keep_base_id_and_transposed_bindings() {
    let page = build(&nested_layout(), &nested_record());

    let nested = page.find_by_id("field2-1-0").unwrap();
    assert_eq!(nested.item().base_component_id.as_deref(), Some("field2"));
    assert_eq!(
        nested.item().data_model_bindings.get("simpleBinding").map(String::as_str),
        Some("Group1[1].Group2[0].prop2")
    );
    assert_eq!(nested.row_index(), Some(0));

    let group2 = page.find_by_id("Group2-1").unwrap();
    assert_eq!(group2.item().first_binding(), Some("Group1[1].Group2"));
    assert_eq!(group2.row_index(), Some(1));

    let field3 = page.find_by_id("field3-1").unwrap();
    assert_eq!(
        field3.item().data_model_bindings.get("simpleBinding").map(String::as_str),
        Some("Group1[1].prop3")
    );
    // Inside a plain container the row comes from the enclosing group.
    assert_eq!(field3.row_index(), None);
    assert_eq!(field3.parent().map(|p| p.row_index()), Some(Some(1)));

    let top = page.find_by_id("top1").unwrap();
    assert_eq!(top.item().base_component_id, None);
}

#[test]
fn base_ids_never_carry_row_suffixes() {
    let page = build(&nested_layout(), &nested_record());
    for node in page.flat(true) {
        let base = node.item().base_id();
        assert!(
            !base.contains("-0") && !base.contains("-1"),
            "{base} carries a row suffix"
        );
        if let Some(row) = node.row_index() {
            assert!(node.id().ends_with(&format!("-{row}")));
        }
    }
}

#[test]
fn empty_nested_group_has_no_rows() {
    let page = build(&nested_layout(), &nested_record());
    let empty = page.find_by_id("Group2-0").unwrap();
    assert!(empty.is_repeating());
    assert!(empty.rows().is_empty());
    assert!(empty.direct_children(None).is_empty());

    let filled = page.find_by_id("Group2-1").unwrap();
    let rows: Vec<_> = filled.rows().iter().map(|row| row.index).collect();
    assert_eq!(rows, vec![0]);
}

#[test]
fn panel_reference_groups_stay_inert() {
    let page = build(&nested_layout(), &nested_record());
    let panel = page.find_by_id("panel").unwrap();
    assert!(panel.is_group());
    assert!(!panel.is_repeating());
    assert_eq!(ids(&panel.direct_children(None)), vec!["panelField"]);

    let field = page.find_by_id("panelField").unwrap();
    assert_eq!(
        field.item().data_model_bindings.get("simpleBinding").map(String::as_str),
        Some("Group1.prop1")
    );
}

#[test]
fn builds_two_by_three_grid() {
    let layout = layout(json!([
        { "id": "outer", "type": "Group", "maxCount": 5, "children": ["inner"],
          "dataModelBindings": { "group": "Outer" } },
        { "id": "inner", "type": "Group", "maxCount": 5, "children": ["leaf"],
          "dataModelBindings": { "group": "Outer.Inner" } },
        { "id": "leaf", "type": "Input", "dataModelBindings": { "simpleBinding": "Outer.Inner.Value" } }
    ]));
    let data = record(json!({
        "Outer": [
            { "Inner": [{ "Value": 1 }, { "Value": 2 }, { "Value": 3 }] },
            { "Inner": [{ "Value": 4 }, { "Value": 5 }, { "Value": 6 }] }
        ]
    }));
    let page = build(&layout, &data);

    let leaves = page.find_all_by_id("leaf");
    assert_eq!(
        ids(&leaves),
        vec!["leaf-0-0", "leaf-0-1", "leaf-0-2", "leaf-1-0", "leaf-1-1", "leaf-1-2"]
    );
    let bindings: Vec<_> = leaves
        .iter()
        .map(|leaf| leaf.item().data_model_bindings["simpleBinding"].clone())
        .collect();
    assert_eq!(bindings[4], "Outer[1].Inner[1].Value");
}

#[test]
fn filter_and_max_count_limit_rows() {
    let layout = layout(json!([
        { "id": "first", "type": "Group", "maxCount": 99, "children": ["a"],
          "dataModelBindings": { "group": "List" },
          "edit": { "filter": [{ "key": "start", "value": "0" }, { "key": "stop", "value": "3" }] } },
        { "id": "a", "type": "Input", "dataModelBindings": { "simpleBinding": "List.Value" } },
        { "id": "second", "type": "Group", "maxCount": 99, "children": ["b"],
          "dataModelBindings": { "group": "List" },
          "edit": { "filter": [{ "key": "start", "value": "3" }, { "key": "stop", "value": "6" }] } },
        { "id": "b", "type": "Input", "dataModelBindings": { "simpleBinding": "List.Value" } },
        { "id": "capped", "type": "Group", "maxCount": 2, "children": ["c"],
          "dataModelBindings": { "group": "List" } },
        { "id": "c", "type": "Input", "dataModelBindings": { "simpleBinding": "List.Value" } }
    ]));
    let data = record(json!({ "List": [{"Value": 0}, {"Value": 1}, {"Value": 2}, {"Value": 3}, {"Value": 4}] }));
    let page = build(&layout, &data);

    let rows = |id: &str| -> Vec<usize> {
        page.find_by_id(id).unwrap().rows().iter().map(|row| row.index).collect()
    };
    assert_eq!(rows("first"), vec![0, 1, 2]);
    assert_eq!(rows("second"), vec![3, 4]);
    assert_eq!(rows("capped"), vec![0, 1]);
    assert_eq!(ids(&page.find_all_by_id("b")), vec!["b-3", "b-4"]);
}

#[test]
fn state_store_drives_rows_even_without_data() {
    let layout = layout(json!([
        { "id": "g", "type": "Group", "maxCount": 4, "children": ["f"],
          "dataModelBindings": { "group": "G" } },
        { "id": "f", "type": "Input", "dataModelBindings": { "simpleBinding": "G.v" } }
    ]));
    let groups = RepeatingGroups::new().with("g", RepeatingGroup::new(2));
    let page = HierarchyBuilder::new(&layout, &groups).build("page").unwrap();
    assert_eq!(ids(&page.find_all_by_id("f")), vec!["f-0", "f-1", "f-2"]);

    let none = RepeatingGroups::new();
    let page = HierarchyBuilder::new(&layout, &none).build("page").unwrap();
    assert!(page.find_all_by_id("f").is_empty());
}

#[test]
fn multi_page_children_record_their_page() {
    let layout = layout(json!([
        { "id": "g", "type": "Group", "maxCount": 3, "children": ["0:a", "1:b"],
          "dataModelBindings": { "group": "G" }, "edit": { "multiPage": true } },
        { "id": "a", "type": "Input", "dataModelBindings": { "simpleBinding": "G.a" } },
        { "id": "b", "type": "Input", "dataModelBindings": { "simpleBinding": "G.b" } }
    ]));
    let page = build(&layout, &record(json!({ "G": [{ "a": 1 }] })));
    assert_eq!(page.find_by_id("a-0").unwrap().item().multi_page_index, Some(0));
    assert_eq!(page.find_by_id("b-0").unwrap().item().multi_page_index, Some(1));
}

#[test]
fn rewrites_text_resources_and_mappings_per_row() {
    let layout = nested_layout();
    let data = nested_record();
    let groups = RepeatingGroups::from_record(&layout, &data);
    let resources = TextResources::new(vec![
        TextResource {
            id: "field1.title".to_string(),
            value: "Row {0}".to_string(),
            variables: vec![TextResourceVariable {
                key: "Group1[{0}].prop1".to_string(),
                data_source: "dataModel.default".to_string(),
            }],
        },
        TextResource {
            id: "field2.title".to_string(),
            value: "Nested {0}".to_string(),
            variables: vec![TextResourceVariable {
                key: "Group1[{0}].Group2[{1}].prop2".to_string(),
                data_source: "dataModel.default".to_string(),
            }],
        },
    ]);
    let mut page = HierarchyBuilder::new(&layout, &groups).build("page").unwrap();
    assert_eq!(
        page.find_by_id("field1-1").unwrap().item().text_resource_bindings["title"],
        PropertyValue::from(json!("field1.title"))
    );
    rewrite_text_resource_bindings(&mut page, &resources);

    let title = |id: &str| page.find_by_id(id).unwrap().item().text_resource_bindings["title"].clone();
    assert_eq!(title("field1-1"), PropertyValue::from(json!("field1.title-1")));
    assert_eq!(title("field2-1-0"), PropertyValue::from(json!("field2.title-1-0")));

    let mapping = page.find_by_id("field2-1-0").unwrap().item().mapping.clone().unwrap();
    assert_eq!(mapping.get("Group1[1].Group2[0].prop2").map(String::as_str), Some("query"));

    let untouched = HierarchyBuilder::new(&layout, &groups)
        .with_options(BuildOptions::default().with_mapping_rewrite(false))
        .build("page")
        .unwrap();
    let node = untouched.find_by_id("field2-1-0").unwrap();
    assert!(node.item().mapping.as_ref().unwrap().contains_key("Group1[{0}].Group2[{1}].prop2"));
}

#[test]
fn missing_children_warn_or_fail_in_strict_mode() {
    let layout = layout(json!([
        { "id": "g", "type": "Group", "children": ["present", "ghost"] },
        { "id": "present", "type": "Input" }
    ]));
    let groups = RepeatingGroups::new();

    let page = HierarchyBuilder::new(&layout, &groups).build("page").unwrap();
    assert_eq!(ids(&page.flat(false)), vec!["present"]);
    assert_eq!(
        page.warnings(),
        &[BuildWarning::MissingChild {
            parent: "g".to_string(),
            child: "ghost".to_string(),
        }]
    );

    let strict = HierarchyBuilder::new(&layout, &groups)
        .with_options(BuildOptions::default().strict(true))
        .build("page");
    assert!(matches!(strict, Err(EngineError::MissingChild { child, .. }) if child == "ghost"));
}

#[test]
fn cyclic_references_are_cut() {
    let layout = layout(json!([
        { "id": "root", "type": "Group", "children": ["x"] },
        { "id": "x", "type": "Group", "children": ["y"] },
        { "id": "y", "type": "Group", "children": ["x", "leaf"] },
        { "id": "leaf", "type": "Paragraph" }
    ]));
    let page = HierarchyBuilder::new(&layout, &RepeatingGroups::new())
        .build("page")
        .unwrap();
    assert_eq!(ids(&page.flat(true)), vec!["root", "x", "y", "leaf"]);
    assert_eq!(
        page.warnings(),
        &[BuildWarning::CyclicReference {
            parent: "y".to_string(),
            child: "x".to_string(),
        }]
    );
}

#[test]
fn flat_layout_helpers() {
    let layout = nested_layout();
    let top: Vec<_> = top_level_components(&layout).iter().map(|c| c.id.as_str()).collect();
    assert_eq!(top, vec!["top1", "top2", "Group1", "panel"]);
    assert!(!has_required_fields(&layout));

    let required = common::layout(json!([{ "id": "a", "type": "Input", "required": ["not", false] }]));
    assert!(has_required_fields(&required));
}

#[test]
fn tree_json_snapshot() {
    let layout = layout(json!([
        { "id": "g", "type": "Group", "maxCount": 2, "children": ["f"],
          "dataModelBindings": { "group": "G" } },
        { "id": "f", "type": "Input", "dataModelBindings": { "simpleBinding": "G.v" } }
    ]));
    let page = build(&layout, &record(json!({ "G": [{ "v": "a" }] })));
    insta::assert_json_snapshot!(page.to_json(), @r###"
    [
      {
        "dataModelBindings": {
          "group": "G"
        },
        "id": "g",
        "maxCount": 2,
        "rows": [
          {
            "index": 0,
            "items": [
              {
                "baseComponentId": "f",
                "dataModelBindings": {
                  "simpleBinding": "G[0].v"
                },
                "id": "f-0",
                "type": "Input"
              }
            ]
          }
        ],
        "type": "Group"
      }
    ]
    "###);
}

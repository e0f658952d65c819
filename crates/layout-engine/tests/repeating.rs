//! Tests for deriving and editing repeating-group state.

mod common;

use common::{build, ids, layout, nested_layout, nested_record, record};
use layout_engine::{RepeatingGroup, RepeatingGroups, remove_group_data};
use layout_model::FormData;
use proptest::prelude::*;
use serde_json::json;

fn simple_layout() -> layout_model::Layout {
    layout(json!([
        { "id": "Group", "type": "Group", "maxCount": 99, "children": ["field"],
          "dataModelBindings": { "group": "Group" } },
        { "id": "field", "type": "Input", "dataModelBindings": { "simpleBinding": "Group.prop" } }
    ]))
}

#[test]
fn nested_groups_are_scoped_per_parent_row() {
    let groups = RepeatingGroups::from_record(&nested_layout(), &nested_record());

    let keys: Vec<_> = groups.keys().collect();
    assert_eq!(keys, vec!["Group1", "Group2-0", "Group2-1"]);

    let group1 = groups.get("Group1").unwrap();
    assert_eq!(group1.index, 1);
    assert_eq!(group1.base_group_id, None);
    assert_eq!(group1.data_model_binding.as_deref(), Some("Group1"));

    let empty = groups.get("Group2-0").unwrap();
    assert_eq!(empty.index, -1);
    assert_eq!(empty.base_group_id.as_deref(), Some("Group2"));
    assert_eq!(groups.get("Group2-1").map(|g| g.index), Some(0));
}

#[test]
fn counts_ignore_key_order_and_gaps() {
    let data: FormData = [
        ("Group[10].prop", json!("x")),
        ("Group[2].prop", json!("y")),
        ("Group[9].prop", json!("z")),
        ("Groups[40].prop", json!("lookalike")),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect();

    let groups = RepeatingGroups::from_record(&simple_layout(), &data);
    assert_eq!(groups.get("Group").map(|g| g.index), Some(10));
}

#[test]
fn groups_without_data_have_no_rows() {
    let groups = RepeatingGroups::from_record(&simple_layout(), &FormData::new());
    assert_eq!(groups.get("Group").map(|g| g.index), Some(-1));
}

#[test]
fn huge_row_indices_are_capped_by_max_count() {
    let layout = layout(json!([
        { "id": "g", "type": "Group", "maxCount": 3, "children": ["inner"],
          "dataModelBindings": { "group": "G" } },
        { "id": "inner", "type": "Group", "maxCount": 3, "children": ["v"],
          "dataModelBindings": { "group": "G.Inner" } },
        { "id": "v", "type": "Input", "dataModelBindings": { "simpleBinding": "G.Inner.v" } }
    ]));
    let data: FormData = [(format!("G[{}].v", usize::MAX), json!(1))].into_iter().collect();

    let groups = RepeatingGroups::from_record(&layout, &data);
    assert_eq!(groups.get("g").map(|g| g.index), Some(i32::MAX));
    assert_eq!(groups.len(), 4);

    let page = build(&layout, &data);
    assert_eq!(page.find_by_id("g").map(|g| g.rows().len()), Some(3));
}

#[test]
fn stray_rows_beyond_max_count_add_no_nested_state() {
    let data: FormData = [("Group1[200000].prop1".to_string(), json!("x"))].into_iter().collect();
    let groups = RepeatingGroups::from_record(&nested_layout(), &data);

    assert_eq!(groups.get("Group1").map(|g| g.index), Some(200_000));
    let keys: Vec<_> = groups.keys().collect();
    assert_eq!(
        keys,
        vec!["Group1", "Group2-0", "Group2-1", "Group2-2", "Group2-3", "Group2-4"]
    );
    assert!(groups.get("Group2-4").is_some_and(|g| g.index == -1));
}

#[test]
fn deeper_nesting_extends_the_key() {
    let layout = layout(json!([
        { "id": "a", "type": "Group", "maxCount": 9, "children": ["b"], "dataModelBindings": { "group": "A" } },
        { "id": "b", "type": "Group", "maxCount": 9, "children": ["c"], "dataModelBindings": { "group": "A.B" } },
        { "id": "c", "type": "Group", "maxCount": 9, "children": ["leaf"], "dataModelBindings": { "group": "A.B.C" } },
        { "id": "leaf", "type": "Input", "dataModelBindings": { "simpleBinding": "A.B.C.v" } }
    ]));
    let data = record(json!({
        "A": [ { "B": [ { "C": [ { "v": 1 }, { "v": 2 } ] } ] } ]
    }));
    let groups = RepeatingGroups::from_record(&layout, &data);
    assert_eq!(groups.get("c-0-0").map(|g| g.index), Some(1));
    assert_eq!(groups.get("c-0-0").and_then(|g| g.base_group_id.clone()).as_deref(), Some("c"));

    let page = build(&layout, &data);
    assert_eq!(ids(&page.find_all_by_id("leaf")), vec!["leaf-0-0-0", "leaf-0-0-1"]);
}

#[test]
fn append_then_rebuild_adds_an_empty_row() {
    let layout = nested_layout();
    let mut groups = RepeatingGroups::from_record(&layout, &nested_record());
    let row = groups.append_row("Group1", &layout).unwrap();
    assert_eq!(row, 2);
    assert_eq!(groups.get("Group1").map(|g| g.edit_index), Some(2));
    assert_eq!(groups.get("Group2-2").map(|g| g.index), Some(-1));

    let page = layout_engine::HierarchyBuilder::new(&layout, &groups)
        .build("page")
        .unwrap();
    assert_eq!(ids(&page.find_all_by_id("field1")), vec!["field1-0", "field1-1", "field1-2"]);
}

#[test]
fn edit_and_multi_page_indices_are_settable() {
    let mut groups = RepeatingGroups::new().with("Group", RepeatingGroup::new(3));
    groups.set_edit_index("Group", 2).unwrap();
    groups.set_multi_page_index("Group", 1).unwrap();
    let group = groups.get("Group").unwrap();
    assert_eq!((group.edit_index, group.multi_page_index), (2, 1));
    assert!(groups.set_edit_index("Missing", 0).is_err());
}

fn rows_record(values: &[u32]) -> FormData {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| (format!("Group[{row}].prop"), json!(value)))
        .collect()
}

proptest! {
    #[test]
    fn index_is_the_highest_row_present(rows in proptest::collection::btree_set(0usize..40, 1..10)) {
        let data: FormData = rows
            .iter()
            .map(|row| (format!("Group[{row}].prop"), json!(row)))
            .collect();
        let groups = RepeatingGroups::from_record(&simple_layout(), &data);
        let expected = *rows.iter().max().unwrap() as i32;
        prop_assert_eq!(groups.get("Group").map(|g| g.index), Some(expected));
    }

    #[test]
    fn shifting_removal_preserves_remaining_rows(
        values in proptest::collection::vec(0u32..1000, 1..8),
        pick in 0usize..8,
    ) {
        let removed = pick % values.len();
        let data = rows_record(&values);
        let after = remove_group_data(&data, "Group", removed, true).unwrap();

        let mut expected = values.clone();
        expected.remove(removed);
        prop_assert_eq!(after, rows_record(&expected));
    }

    #[test]
    fn shifting_nested_entries_preserves_their_content(
        counts in proptest::collection::vec(-1i32..6, 1..6),
        pick in 0usize..6,
    ) {
        let layout = nested_layout();
        let removed = pick % counts.len();
        let mut groups = RepeatingGroups::new()
            .with("Group1", RepeatingGroup::new(counts.len() as i32 - 1));
        for (row, count) in counts.iter().enumerate() {
            groups.insert(format!("Group2-{row}"), RepeatingGroup::new(*count));
        }

        groups.remove_row("Group1", removed, true, &layout).unwrap();

        let mut expected = counts.clone();
        expected.remove(removed);
        prop_assert_eq!(groups.get("Group1").map(|g| g.index), Some(expected.len() as i32 - 1));
        for (row, count) in expected.iter().enumerate() {
            prop_assert_eq!(groups.get(&format!("Group2-{row}")).map(|g| g.index), Some(*count));
        }
        let missing_key = format!("Group2-{}", expected.len());
        prop_assert!(groups.get(&missing_key).is_none());
    }
}

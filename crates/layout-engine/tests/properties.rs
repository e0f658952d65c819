//! Property tests over generated records and paths.

mod common;

use common::{build, layout};
use layout_engine::transpose::transpose_path;
use layout_model::{DataModelPath, FormData, PathSegment};
use proptest::prelude::*;
use serde_json::json;

fn segment() -> impl Strategy<Value = PathSegment> {
    (prop::sample::select(vec!["A", "B", "C", "Items"]), prop::option::of(0usize..12))
        .prop_map(|(name, index)| PathSegment::new(name, index))
}

fn path() -> impl Strategy<Value = DataModelPath> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| {
        let raw = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        DataModelPath::parse(&raw).unwrap()
    })
}

proptest! {
    #[test]
    fn transposition_is_idempotent(ours in path(), theirs in path()) {
        let once = transpose_path(&ours, &theirs);
        prop_assert_eq!(transpose_path(&ours, &once), once.clone());
        prop_assert_eq!(once.len(), theirs.len());
    }

    #[test]
    fn existing_indices_are_never_overwritten(ours in path(), theirs in path()) {
        let out = transpose_path(&ours, &theirs);
        for (before, after) in theirs.segments().iter().zip(out.segments()) {
            prop_assert_eq!(&before.name, &after.name);
            if before.index.is_some() {
                prop_assert_eq!(before.index, after.index);
            }
        }
    }

    #[test]
    fn rows_match_data_up_to_max_count(last in 0usize..15, max_count in 2u32..10) {
        let layout = layout(json!([
            { "id": "g", "type": "Group", "maxCount": max_count, "children": ["f"],
              "dataModelBindings": { "group": "G" } },
            { "id": "f", "type": "Input", "dataModelBindings": { "simpleBinding": "G.v" } }
        ]));
        let data: FormData = [(format!("G[{last}].v"), json!(last))].into_iter().collect();
        let page = build(&layout, &data);

        let expected = (last + 1).min(max_count as usize);
        let leaves = page.find_all_by_id("f");
        prop_assert_eq!(leaves.len(), expected);
        for (row, leaf) in leaves.iter().enumerate() {
            prop_assert_eq!(leaf.id(), format!("f-{row}"));
            prop_assert_eq!(leaf.item().base_component_id.as_deref(), Some("f"));
        }
    }
}

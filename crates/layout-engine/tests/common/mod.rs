//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use layout_engine::{BuildOptions, HierarchyBuilder, LayoutPage, RepeatingGroups};
use layout_model::{FormData, Layout, flatten_object};
use serde_json::{Value, json};

pub fn layout(components: Value) -> Layout {
    Layout::from_json(&components).unwrap()
}

pub fn record(data: Value) -> FormData {
    flatten_object(&data)
}

/// Two top-level inputs, a repeating group with a nested repeating group and a plain
/// container, and a panel that references the repeating group.
pub fn nested_layout() -> Layout {
    layout(json!([
        { "id": "top1", "type": "Input", "dataModelBindings": { "simpleBinding": "Model.Top1" } },
        { "id": "top2", "type": "Input", "dataModelBindings": { "simpleBinding": "Model.Top2" } },
        { "id": "Group1", "type": "Group", "maxCount": 5,
          "children": ["field1", "Group2", "container"],
          "dataModelBindings": { "group": "Group1" } },
        { "id": "field1", "type": "Input",
          "dataModelBindings": { "simpleBinding": "Group1.prop1" },
          "textResourceBindings": { "title": "field1.title" } },
        { "id": "Group2", "type": "Group", "maxCount": 5,
          "children": ["field2", "field2b"],
          "dataModelBindings": { "group": "Group1.Group2" } },
        { "id": "field2", "type": "Input",
          "dataModelBindings": { "simpleBinding": "Group1.Group2.prop2" },
          "textResourceBindings": { "title": "field2.title" },
          "mapping": { "Group1[{0}].Group2[{1}].prop2": "query" } },
        { "id": "field2b", "type": "Header" },
        { "id": "container", "type": "Group", "children": ["field3"] },
        { "id": "field3", "type": "Input", "dataModelBindings": { "simpleBinding": "Group1.prop3" } },
        { "id": "panel", "type": "Group", "maxCount": 3, "children": ["panelField"],
          "panel": { "groupReference": { "group": "Group1" } } },
        { "id": "panelField", "type": "Input", "dataModelBindings": { "simpleBinding": "Group1.prop1" } }
    ]))
}

pub fn nested_record() -> FormData {
    record(json!({
        "Model": { "Top1": "a" },
        "Group1": [
            { "prop1": "first" },
            { "prop1": "second", "Group2": [{ "prop2": "nested" }] }
        ]
    }))
}

pub fn build(layout: &Layout, data: &FormData) -> LayoutPage {
    let groups = RepeatingGroups::from_record(layout, data);
    HierarchyBuilder::new(layout, &groups)
        .with_options(BuildOptions::default())
        .build("page")
        .unwrap()
}

pub fn ids(nodes: &[layout_engine::NodeRef<'_>]) -> Vec<String> {
    nodes.iter().map(|node| node.id().to_string()).collect()
}

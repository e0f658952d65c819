//! Per-row text resource ids.
//!
//! A text resource whose variables point into a repeating group row is addressed as
//! `<id>-<row>` for every enclosing row it is bound to. Expressions may choose which text
//! resource a binding uses, so this runs on resolved trees.

use std::collections::BTreeMap;

use layout_model::component::GROUP_BINDING;
use layout_model::{DataModelPath, PropertyValue, TextResources};
use serde_json::Value;
use tracing::debug;

use crate::node::{NodeId, NodeRef};
use crate::page::LayoutPage;
use crate::pages::LayoutPages;

/// Rewrites literal text resource bindings of every node on `page`.
pub fn rewrite_text_resource_bindings(page: &mut LayoutPage, resources: &TextResources) {
    let updates: Vec<_> = page
        .flat(true)
        .into_iter()
        .filter_map(|node| rewritten_bindings(node, resources).map(|bindings| (node.node_id(), bindings)))
        .collect();
    debug!(page = page.name(), rewritten = updates.len(), "suffixed text resource ids");
    apply(page, updates);
}

/// Rewrites text resource bindings on every page of the collection.
pub fn rewrite_all_text_resource_bindings(pages: &mut LayoutPages, resources: &TextResources) {
    for position in 0..pages.all().len() {
        if let Some(page) = pages.page_mut(position) {
            rewrite_text_resource_bindings(page, resources);
        }
    }
}

fn apply(page: &mut LayoutPage, updates: Vec<(NodeId, BTreeMap<String, PropertyValue>)>) {
    for (id, bindings) in updates {
        page.node_at_mut(id).item.text_resource_bindings = bindings;
    }
}

/// Enclosing repeating rows of `node`, outermost first, each with its group binding.
fn row_frames(node: NodeRef<'_>) -> Vec<(usize, Option<DataModelPath>)> {
    let mut frames = Vec::new();
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.is_repeating()
            && let Some(row) = current.row_index()
        {
            let binding = parent
                .item()
                .data_model_bindings
                .get(GROUP_BINDING)
                .and_then(|binding| DataModelPath::parse(binding).ok())
                .map(|path| path.without_indices());
            frames.push((row, binding));
        }
        current = parent;
    }
    frames.reverse();
    frames
}

/// The node's bindings with row suffixes applied, or `None` when nothing changes.
fn rewritten_bindings(node: NodeRef<'_>, resources: &TextResources) -> Option<BTreeMap<String, PropertyValue>> {
    let bindings = &node.item().text_resource_bindings;
    if bindings.is_empty() {
        return None;
    }
    let frames = row_frames(node);
    if frames.is_empty() {
        return None;
    }

    let mut changed = false;
    let mut out = bindings.clone();
    for value in out.values_mut() {
        let PropertyValue::Literal(Value::String(key)) = value else {
            continue;
        };
        let Some(resource) = resources.get(key) else {
            continue;
        };
        for (row, binding) in &frames {
            if binding
                .as_ref()
                .is_some_and(|binding| resource.has_index_variable_for(binding))
            {
                key.push('-');
                key.push_str(&row.to_string());
                changed = true;
            }
        }
    }
    changed.then_some(out)
}

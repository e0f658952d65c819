//! A built page: the node arena plus lookup tables.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::hierarchy::BuildWarning;
use crate::node::{LayoutNode, NodeChildren, NodeId, NodeItem, NodeRef};
use crate::pages::LayoutPages;

/// One page of a form, materialized into a tree.
///
/// Nodes live in an arena in depth-first order (rows ascending), so arena order is
/// also the order every traversal reports.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    name: String,
    nodes: Vec<LayoutNode>,
    top_level: Vec<NodeId>,
    by_id: HashMap<String, Vec<NodeId>>,
    warnings: Vec<BuildWarning>,
}

impl LayoutPage {
    pub(crate) fn new(
        name: impl Into<String>,
        nodes: Vec<LayoutNode>,
        top_level: Vec<NodeId>,
        warnings: Vec<BuildWarning>,
    ) -> Self {
        let mut by_id: HashMap<String, Vec<NodeId>> = HashMap::new();
        for (position, node) in nodes.iter().enumerate() {
            let id = NodeId(position);
            by_id.entry(node.item.id.clone()).or_default().push(id);
            if let Some(base) = &node.item.base_component_id
                && *base != node.item.id
            {
                by_id.entry(base.clone()).or_default().push(id);
            }
        }
        Self {
            name: name.into(),
            nodes,
            top_level,
            by_id,
            warnings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Problems found while building, such as dangling child references.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub(crate) fn node_at(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_at_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        &mut self.nodes[id.0]
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.node_in(id, None)
    }

    pub(crate) fn node_in<'a>(&'a self, id: NodeId, pages: Option<&'a LayoutPages>) -> Option<NodeRef<'a>> {
        (id.0 < self.nodes.len()).then(|| NodeRef::new(self, pages, id))
    }

    pub fn top_level(&self) -> Vec<NodeRef<'_>> {
        self.top_level
            .iter()
            .map(|&id| NodeRef::new(self, None, id))
            .collect()
    }

    pub(crate) fn find_top_level<'a, P>(&'a self, predicate: &P, pages: Option<&'a LayoutPages>) -> Option<NodeRef<'a>>
    where
        P: Fn(&NodeItem) -> bool,
    {
        self.top_level
            .iter()
            .map(|&id| NodeRef::new(self, pages, id))
            .find(|node| predicate(node.item()))
    }

    /// Every node on the page in depth-first order.
    pub fn flat(&self, include_groups: bool) -> Vec<NodeRef<'_>> {
        self.flat_in(include_groups, None)
    }

    pub(crate) fn flat_in<'a>(&'a self, include_groups: bool, pages: Option<&'a LayoutPages>) -> Vec<NodeRef<'a>> {
        (0..self.nodes.len())
            .map(NodeId)
            .map(|id| NodeRef::new(self, pages, id))
            .filter(|node| include_groups || !node.is_group())
            .collect()
    }

    /// First node whose resolved or declared id equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeRef<'_>> {
        self.find_by_id_in(id, None)
    }

    pub(crate) fn find_by_id_in<'a>(&'a self, id: &str, pages: Option<&'a LayoutPages>) -> Option<NodeRef<'a>> {
        self.by_id
            .get(id)
            .and_then(|ids| ids.first())
            .map(|&node| NodeRef::new(self, pages, node))
    }

    /// Every node carrying `id`, including all repeated copies of a declared id.
    pub fn find_all_by_id(&self, id: &str) -> Vec<NodeRef<'_>> {
        self.find_all_by_id_in(id, None)
    }

    pub(crate) fn find_all_by_id_in<'a>(&'a self, id: &str, pages: Option<&'a LayoutPages>) -> Vec<NodeRef<'a>> {
        self.by_id
            .get(id)
            .map(|ids| ids.iter().map(|&node| NodeRef::new(self, pages, node)).collect())
            .unwrap_or_default()
    }

    /// True once no node holds an unevaluated expression.
    pub fn is_resolved(&self) -> bool {
        self.nodes.iter().all(|node| !node.item.has_expressions())
    }

    /// Renders the tree as nested JSON, rows under `rows` and plain children under
    /// `children`.
    pub fn to_json(&self) -> Value {
        Value::Array(self.top_level.iter().map(|&id| self.node_json(id)).collect())
    }

    fn node_json(&self, id: NodeId) -> Value {
        let node = self.node_at(id);
        let mut object = match serde_json::to_value(&node.item) {
            Ok(Value::Object(object)) => object,
            _ => Map::new(),
        };
        match &node.children {
            NodeChildren::None => {}
            NodeChildren::Plain(children) => {
                let children = children.iter().map(|&child| self.node_json(child)).collect();
                object.insert("children".to_string(), Value::Array(children));
            }
            NodeChildren::Rows(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| {
                        let mut entry = Map::new();
                        entry.insert("index".to_string(), Value::from(row.index));
                        if let Some(hidden) = row.hidden {
                            entry.insert("hidden".to_string(), Value::Bool(hidden));
                        }
                        let items = row.items.iter().map(|&child| self.node_json(child)).collect();
                        entry.insert("items".to_string(), Value::Array(items));
                        Value::Object(entry)
                    })
                    .collect();
                object.insert("rows".to_string(), Value::Array(rows));
            }
        }
        Value::Object(object)
    }
}

//! Resolved nodes and the traversal API.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use layout_model::component::GROUP_BINDING;
use layout_model::{ComponentDef, GroupEdit, PanelConfig, PropertyValue};
use serde::Serialize;

use crate::page::LayoutPage;
use crate::pages::LayoutPages;
use crate::transpose::transpose_for_node;

/// Index of a node in its page's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A component definition cloned into the tree, with row-specific rewrites applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeItem {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_component_id: Option<String>,

    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data_model_bindings: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<GroupEdit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<PanelConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<PropertyValue>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub text_resource_bindings: BTreeMap<String, PropertyValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_page_index: Option<usize>,

    #[serde(flatten)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl NodeItem {
    pub fn from_def(def: &ComponentDef) -> Self {
        Self {
            id: def.id.clone(),
            base_component_id: None,
            component_type: def.component_type.clone(),
            data_model_bindings: def.data_model_bindings.clone(),
            max_count: def.max_count,
            edit: def.edit.clone(),
            panel: def.panel.clone(),
            hidden: def.hidden.clone(),
            text_resource_bindings: def.text_resource_bindings.clone(),
            mapping: def.mapping.clone(),
            multi_page_index: None,
            properties: def.properties.clone(),
        }
    }

    /// The id the component was declared with.
    pub fn base_id(&self) -> &str {
        self.base_component_id.as_deref().unwrap_or(&self.id)
    }

    /// Matches either the resolved id or the declared id.
    pub fn has_id(&self, id: &str) -> bool {
        self.id == id || self.base_component_id.as_deref() == Some(id)
    }

    pub fn is_group(&self) -> bool {
        layout_model::component::GROUP_TYPES.contains(&self.component_type.as_str())
    }

    /// The binding used as reference point for transposition: the group binding when
    /// present, otherwise the first binding by name.
    pub fn first_binding(&self) -> Option<&str> {
        self.data_model_bindings
            .get(GROUP_BINDING)
            .or_else(|| self.data_model_bindings.values().next())
            .map(String::as_str)
    }

    pub fn is_hidden_literal(&self) -> bool {
        self.hidden.as_ref().and_then(PropertyValue::as_bool).unwrap_or(false)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// True while any property still holds an unevaluated expression.
    pub fn has_expressions(&self) -> bool {
        self.hidden.iter().any(PropertyValue::is_expression)
            || self.text_resource_bindings.values().any(PropertyValue::is_expression)
            || self.properties.values().any(PropertyValue::is_expression)
            || self
                .edit
                .iter()
                .flat_map(|edit| edit.extra.values())
                .any(PropertyValue::is_expression)
    }

    /// Every slot that may hold an expression.
    pub(crate) fn dynamic_values_mut(&mut self) -> impl Iterator<Item = &mut PropertyValue> {
        self.hidden
            .iter_mut()
            .chain(self.text_resource_bindings.values_mut())
            .chain(self.properties.values_mut())
            .chain(self.edit.iter_mut().flat_map(|edit| edit.extra.values_mut()))
    }
}

/// One row of a repeating group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub index: usize,
    #[serde(skip)]
    pub items: Vec<NodeId>,
    /// Result of the group's `hiddenRow` expression for this row, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeChildren {
    #[default]
    None,
    Plain(Vec<NodeId>),
    Rows(Vec<Row>),
}

/// Arena entry of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub(crate) item: NodeItem,
    pub(crate) parent: Option<NodeId>,
    pub(crate) row_index: Option<usize>,
    pub(crate) children: NodeChildren,
}

impl LayoutNode {
    pub(crate) fn new(item: NodeItem, parent: Option<NodeId>, row_index: Option<usize>) -> Self {
        Self {
            item,
            parent,
            row_index,
            children: NodeChildren::None,
        }
    }

    pub fn item(&self) -> &NodeItem {
        &self.item
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn row_index(&self) -> Option<usize> {
        self.row_index
    }

    pub fn children(&self) -> &NodeChildren {
        &self.children
    }
}

/// A borrowed handle to a node, able to walk its page and, when built as part of a
/// collection, the other pages.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    page: &'a LayoutPage,
    pages: Option<&'a LayoutPages>,
    id: NodeId,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("page", &self.page.name())
            .field("id", &self.item().id)
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.page, other.page) && self.id == other.id
    }
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(page: &'a LayoutPage, pages: Option<&'a LayoutPages>, id: NodeId) -> Self {
        Self { page, pages, id }
    }

    fn at(&self, id: NodeId) -> Self {
        Self { id, ..*self }
    }

    fn node(&self) -> &'a LayoutNode {
        self.page.node_at(self.id)
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn page(&self) -> &'a LayoutPage {
        self.page
    }

    /// The collection the node was reached through, if any.
    pub fn pages(&self) -> Option<&'a LayoutPages> {
        self.pages
    }

    pub fn item(&self) -> &'a NodeItem {
        &self.node().item
    }

    pub fn id(&self) -> &'a str {
        &self.item().id
    }

    pub fn row_index(&self) -> Option<usize> {
        self.node().row_index
    }

    pub fn is_group(&self) -> bool {
        self.item().is_group()
    }

    pub fn is_repeating(&self) -> bool {
        matches!(self.node().children, NodeChildren::Rows(_))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|parent| self.at(parent))
    }

    /// Rows of a repeating group; empty for anything else.
    pub fn rows(&self) -> &'a [Row] {
        match &self.node().children {
            NodeChildren::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Direct children in order, optionally limited to one row of a repeating group.
    pub fn direct_children(&self, only_in_row: Option<usize>) -> Vec<NodeRef<'a>> {
        match &self.node().children {
            NodeChildren::None => Vec::new(),
            NodeChildren::Plain(ids) => ids.iter().map(|&id| self.at(id)).collect(),
            NodeChildren::Rows(rows) => rows
                .iter()
                .filter(|row| only_in_row.is_none_or(|index| row.index == index))
                .flat_map(|row| row.items.iter().map(|&id| self.at(id)))
                .collect(),
        }
    }

    /// The node and its subtree in depth-first order. Groups are skipped unless
    /// `include_groups` is set; `only_in_row` limits this node's own rows.
    pub fn flat(&self, include_groups: bool, only_in_row: Option<usize>) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        self.collect_flat(include_groups, only_in_row, &mut out);
        out
    }

    fn collect_flat(&self, include_groups: bool, only_in_row: Option<usize>, out: &mut Vec<NodeRef<'a>>) {
        if include_groups || !self.is_group() {
            out.push(*self);
        }
        for child in self.direct_children(only_in_row) {
            child.collect_flat(include_groups, None, out);
        }
    }

    /// The `occurrence`-th descendant matching `predicate`, depth-first.
    pub fn children<P>(&self, predicate: P, occurrence: usize) -> Option<NodeRef<'a>>
    where
        P: Fn(&NodeItem) -> bool,
    {
        self.flat(true, None)
            .into_iter()
            .skip(1)
            .filter(|node| predicate(node.item()))
            .nth(occurrence)
    }

    /// Ancestors, nearest first.
    pub fn parents(&self) -> Vec<NodeRef<'a>> {
        std::iter::successors(self.parent(), NodeRef::parent).collect()
    }

    /// The nearest ancestor matching `predicate`.
    pub fn closest<P>(&self, predicate: P) -> Option<NodeRef<'a>>
    where
        P: Fn(&NodeItem) -> bool,
    {
        std::iter::successors(self.parent(), NodeRef::parent).find(|node| predicate(node.item()))
    }

    /// Searches outward from this node: the node itself, its siblings in the same row,
    /// then the same search from each ancestor, then the page's top level and finally
    /// the top level of the other pages in the collection.
    pub fn closest_nearby<P>(&self, predicate: P) -> Option<NodeRef<'a>>
    where
        P: Fn(&NodeItem) -> bool,
    {
        let mut current = *self;
        loop {
            if predicate(current.item()) {
                return Some(current);
            }
            let Some(parent) = current.parent() else {
                break;
            };
            if let Some(sibling) = parent
                .direct_children(current.row_index())
                .into_iter()
                .find(|node| predicate(node.item()))
            {
                return Some(sibling);
            }
            current = parent;
        }

        if let Some(found) = self.page.find_top_level(&predicate, self.pages) {
            return Some(found);
        }
        let pages = self.pages?;
        pages
            .iter_except(self.page.name())
            .find_map(|page| page.find_top_level(&predicate, Some(pages)))
    }

    /// Transposes `data_model` with this node's row indices.
    pub fn transpose_data_model(&self, data_model: &str) -> String {
        transpose_for_node(*self, data_model, None)
    }

    /// True when the node or one of its ancestors is hidden, either through its own
    /// resolved `hidden` property or through `hidden_ids`.
    pub fn is_hidden(&self, hidden_ids: &BTreeSet<String>) -> bool {
        std::iter::once(*self)
            .chain(self.parents())
            .any(|node| {
                let item = node.item();
                item.is_hidden_literal()
                    || hidden_ids.contains(&item.id)
                    || hidden_ids.contains(item.base_id())
            })
    }
}

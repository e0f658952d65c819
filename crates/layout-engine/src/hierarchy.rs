//! Builds node trees from flat layouts.
//!
//! Children of a repeating group are cloned once per row. Each clone gets the ancestor
//! row chain appended to its id, its bindings transposed into the row, and (optionally)
//! its mapping keys rewritten for the row. Text resource ids are suffixed later, once
//! expressions have picked them (see [`crate::texts`]).

use std::fmt;
use std::ops::Range;

use layout_model::text::replace_first_index_marker;
use layout_model::{ComponentDef, DataModelPath, Layout};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::node::{LayoutNode, NodeChildren, NodeId, NodeItem, Row};
use crate::options::BuildOptions;
use crate::page::LayoutPage;
use crate::repeating::{RepeatingGroups, group_key};
use crate::transpose::transpose_path;

/// A non-fatal problem found while building a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BuildWarning {
    /// A `children` entry names a component that is not in the layout.
    MissingChild { parent: String, child: String },
    /// A group lists itself, directly or through its descendants.
    CyclicReference { parent: String, child: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChild { parent, child } => {
                write!(f, "'{parent}' references missing child '{child}'")
            }
            Self::CyclicReference { parent, child } => {
                write!(f, "'{parent}' references '{child}' which is already an ancestor")
            }
        }
    }
}

/// Rows of `def` that become part of the tree, given the last row in the state store.
///
/// `edit.filter` start is inclusive and stop exclusive; rows at or beyond `maxCount`
/// are never created.
pub fn visible_rows(def: &ComponentDef, last_index: i32) -> Range<usize> {
    let Ok(last) = usize::try_from(last_index) else {
        return 0..0;
    };
    let (start, stop) = def.filter_bounds();
    let mut end = last + 1;
    if let Some(stop) = stop {
        end = end.min(stop);
    }
    if let Some(max_count) = def.max_count {
        end = end.min(max_count as usize);
    }
    let start = start.unwrap_or(0);
    start..end.max(start)
}

/// Components not referenced as children by any group, in declared order.
pub fn top_level_components(layout: &Layout) -> Vec<&ComponentDef> {
    layout.top_level()
}

/// True when any component may be required.
pub fn has_required_fields(layout: &Layout) -> bool {
    layout.has_required_fields()
}

/// One enclosing repeating-group row.
#[derive(Debug, Clone)]
struct RowFrame {
    /// Concrete data-model path of the row, e.g. `Group1[0].Group2[1]`.
    path: Option<DataModelPath>,
    row: usize,
}

#[derive(Default)]
struct Arena {
    nodes: Vec<LayoutNode>,
    warnings: Vec<BuildWarning>,
}

impl Arena {
    fn push(&mut self, node: LayoutNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn warn(&mut self, warning: BuildWarning) {
        if !self.warnings.contains(&warning) {
            warn!(%warning, "skipping child reference");
            self.warnings.push(warning);
        }
    }
}

/// Turns one flat layout into a [`LayoutPage`].
pub struct HierarchyBuilder<'a> {
    layout: &'a Layout,
    groups: &'a RepeatingGroups,
    options: BuildOptions,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(layout: &'a Layout, groups: &'a RepeatingGroups) -> Self {
        Self {
            layout,
            groups,
            options: BuildOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(&self, name: &str) -> Result<LayoutPage> {
        let mut arena = Arena::default();
        let mut ancestors = Vec::new();
        let mut top_level = Vec::new();
        for def in self.layout.top_level() {
            top_level.push(self.build_component(def, None, None, None, &[], &mut ancestors, &mut arena)?);
        }
        debug!(
            page = name,
            nodes = arena.nodes.len(),
            warnings = arena.warnings.len(),
            "built page"
        );
        Ok(LayoutPage::new(name, arena.nodes, top_level, arena.warnings))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_component(
        &self,
        def: &'a ComponentDef,
        parent: Option<NodeId>,
        row_index: Option<usize>,
        multi_page_index: Option<usize>,
        frames: &[RowFrame],
        ancestors: &mut Vec<&'a str>,
        arena: &mut Arena,
    ) -> Result<NodeId> {
        let mut item = self.clone_item(def, frames);
        item.multi_page_index = multi_page_index;
        let id = arena.push(LayoutNode::new(item, parent, row_index));
        if !def.is_group() {
            return Ok(id);
        }

        ancestors.push(&def.id);
        let children = if def.is_repeating_group() {
            NodeChildren::Rows(self.build_rows(def, id, frames, ancestors, arena)?)
        } else {
            NodeChildren::Plain(self.build_children(def, id, None, frames, ancestors, arena)?)
        };
        ancestors.pop();
        arena.nodes[id.0].children = children;
        Ok(id)
    }

    fn build_children(
        &self,
        def: &'a ComponentDef,
        parent: NodeId,
        row_index: Option<usize>,
        frames: &[RowFrame],
        ancestors: &mut Vec<&'a str>,
        arena: &mut Arena,
    ) -> Result<Vec<NodeId>> {
        let mut children = Vec::new();
        for child in def.child_refs() {
            if ancestors.contains(&child.id) {
                arena.warn(BuildWarning::CyclicReference {
                    parent: def.id.clone(),
                    child: child.id.to_string(),
                });
                continue;
            }
            let Some(child_def) = self.layout.get(child.id) else {
                if self.options.strict_references {
                    return Err(EngineError::MissingChild {
                        parent: def.id.clone(),
                        child: child.id.to_string(),
                    });
                }
                arena.warn(BuildWarning::MissingChild {
                    parent: def.id.clone(),
                    child: child.id.to_string(),
                });
                continue;
            };
            children.push(self.build_component(
                child_def,
                Some(parent),
                row_index,
                child.multi_page_index,
                frames,
                ancestors,
                arena,
            )?);
        }
        Ok(children)
    }

    fn build_rows(
        &self,
        def: &'a ComponentDef,
        group: NodeId,
        frames: &[RowFrame],
        ancestors: &mut Vec<&'a str>,
        arena: &mut Arena,
    ) -> Result<Vec<Row>> {
        let chain: Vec<usize> = frames.iter().map(|frame| frame.row).collect();
        let key = group_key(&def.id, &chain);
        let last = self.groups.get(&key).map_or(-1, |state| state.index);

        // Bindings of the group node itself were already transposed by the outer rows.
        let concrete = arena.nodes[group.0]
            .item
            .first_binding()
            .filter(|_| def.group_binding().is_some())
            .and_then(|binding| DataModelPath::parse(binding).ok());

        let mut rows = Vec::new();
        for row in visible_rows(def, last) {
            let mut inner = frames.to_vec();
            inner.push(RowFrame {
                path: concrete.clone().map(|mut path| {
                    let position = path.len() - 1;
                    path.set_index(position, Some(row));
                    path
                }),
                row,
            });
            let items = self.build_children(def, group, Some(row), &inner, ancestors, arena)?;
            rows.push(Row {
                index: row,
                items,
                hidden: None,
            });
        }
        debug!(group = %key, last, rows = rows.len(), "expanded repeating group");
        Ok(rows)
    }

    fn clone_item(&self, def: &ComponentDef, frames: &[RowFrame]) -> NodeItem {
        let mut item = NodeItem::from_def(def);
        if frames.is_empty() {
            return item;
        }

        let chain: Vec<usize> = frames.iter().map(|frame| frame.row).collect();
        item.id = group_key(&def.id, &chain);
        item.base_component_id = Some(def.id.clone());

        if let Some(scope) = frames.iter().rev().find_map(|frame| frame.path.as_ref()) {
            for binding in item.data_model_bindings.values_mut() {
                if let Ok(path) = DataModelPath::parse(binding) {
                    *binding = transpose_path(scope, &path).to_string();
                }
            }
        }

        if self.options.rewrite_mappings
            && let Some(mapping) = item.mapping.take()
        {
            item.mapping = Some(
                mapping
                    .into_iter()
                    .map(|(key, value)| {
                        let key = frames
                            .iter()
                            .fold(key, |key, frame| replace_first_index_marker(&key, frame.row));
                        (key, value)
                    })
                    .collect(),
            );
        }

        item
    }
}

//! Repeating-group state store.
//!
//! Entries are keyed by group id for top-level groups and by `id-r1-r2...` for groups
//! nested inside repeating rows (one suffix per repeating ancestor, outermost first).

use std::collections::BTreeMap;

use layout_model::{ComponentDef, FormData, Layout, LayoutSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::indexer;

/// Row bookkeeping for one (possibly parent-qualified) repeating group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatingGroup {
    /// Highest materialized row, -1 when the group has no rows.
    pub index: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model_binding: Option<String>,

    #[serde(default = "unset")]
    pub edit_index: i32,

    #[serde(default = "unset")]
    pub multi_page_index: i32,
}

fn unset() -> i32 {
    -1
}

impl RepeatingGroup {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            base_group_id: None,
            data_model_binding: None,
            edit_index: -1,
            multi_page_index: -1,
        }
    }

    /// An entry for `def` with no rows yet.
    pub fn empty_for(def: &ComponentDef, nested: bool) -> Self {
        Self {
            base_group_id: nested.then(|| def.id.clone()),
            data_model_binding: def.group_binding().map(str::to_string),
            ..Self::new(-1)
        }
    }

    /// Number of rows the entry describes.
    pub fn row_count(&self) -> usize {
        usize::try_from(self.index + 1).unwrap_or(0)
    }
}

/// Builds the store key for `group_id` under the given chain of ancestor rows.
pub fn group_key(group_id: &str, rows: &[usize]) -> String {
    let mut key = group_id.to_string();
    for row in rows {
        key.push('-');
        key.push_str(&row.to_string());
    }
    key
}

/// Mapping from group key to its row state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepeatingGroups {
    groups: BTreeMap<String, RepeatingGroup>,
}

impl RepeatingGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the store from the keys of a flat data record.
    pub fn from_record(layout: &Layout, record: &FormData) -> Self {
        indexer::repeating_groups_from_record(layout, record)
    }

    /// Derives and merges the stores of every page in `layouts`.
    pub fn from_layouts(layouts: &LayoutSet, record: &FormData) -> Self {
        let mut merged = Self::new();
        for (_, layout) in layouts.iter() {
            merged.groups.extend(Self::from_record(layout, record).groups);
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&RepeatingGroup> {
        self.groups.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, group: RepeatingGroup) {
        self.groups.insert(key.into(), group);
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, group: RepeatingGroup) -> Self {
        self.insert(key, group);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RepeatingGroup)> {
        self.groups.iter().map(|(key, group)| (key.as_str(), group))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Appends a row to the group stored under `key` and returns the new row index.
    ///
    /// Every repeating group nested under the new row gets an empty entry, and the new
    /// row becomes the group's edit row.
    pub fn append_row(&mut self, key: &str, layout: &Layout) -> Result<usize> {
        let (def, suffix) = self.resolve_key(key, layout)?;
        let nested = !suffix.is_empty();
        let entry = self
            .groups
            .entry(key.to_string())
            .or_insert_with(|| RepeatingGroup::empty_for(def, nested));

        if let Some(max_count) = def.max_count
            && entry.row_count() >= max_count as usize
        {
            return Err(EngineError::MaxCountReached {
                group: key.to_string(),
                max_count,
            });
        }

        entry.index = entry.index.checked_add(1).ok_or_else(|| EngineError::MaxCountReached {
            group: key.to_string(),
            max_count: def.max_count.unwrap_or(u32::MAX),
        })?;
        entry.edit_index = entry.index;
        let row = entry.row_count() - 1;

        let prefix = format!("{suffix}-{row}");
        for child in repeating_children(layout, def) {
            self.groups.insert(
                format!("{}{prefix}", child.id),
                RepeatingGroup::empty_for(child, true),
            );
        }
        debug!(group = key, row, "appended row");
        Ok(row)
    }

    /// Removes row `index` from the group stored under `key`.
    ///
    /// Entries of nested groups belonging to the removed row are deleted. With `shift`,
    /// entries of later rows are re-keyed one row down so they keep their content.
    pub fn remove_row(&mut self, key: &str, index: usize, shift: bool, layout: &Layout) -> Result<()> {
        let (def, suffix) = self.resolve_key(key, layout)?;
        let entry = self
            .groups
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownGroup(key.to_string()))?;
        if index >= entry.row_count() {
            return Err(EngineError::RowOutOfRange {
                group: key.to_string(),
                index,
                last: entry.index,
            });
        }
        entry.index -= 1;
        entry.edit_index = -1;

        let descendants: Vec<String> = repeating_descendants(layout, def)
            .into_iter()
            .map(|child| child.id.clone())
            .collect();
        for group_id in &descendants {
            self.remove_nested_rows(group_id, suffix, index, shift);
        }
        debug!(group = key, row = index, shift, "removed row");
        Ok(())
    }

    /// Drops the entries of `group_id` that belong to parent row `index` (under the
    /// ancestor chain `parent_suffix`), optionally shifting later parent rows down.
    pub fn remove_nested_rows(&mut self, group_id: &str, parent_suffix: &str, index: usize, shift: bool) {
        let marker = format!("{group_id}{parent_suffix}-");
        let groups = std::mem::take(&mut self.groups);
        for (key, group) in groups {
            let Some(rest) = key.strip_prefix(&marker) else {
                self.groups.insert(key, group);
                continue;
            };
            let digits_len = rest.find('-').unwrap_or(rest.len());
            let (digits, tail) = rest.split_at(digits_len);
            let Ok(row) = digits.parse::<usize>() else {
                self.groups.insert(key, group);
                continue;
            };
            if row == index {
                continue;
            }
            if shift && row > index {
                self.groups.insert(format!("{marker}{}{tail}", row - 1), group);
            } else {
                self.groups.insert(key, group);
            }
        }
    }

    pub fn set_edit_index(&mut self, key: &str, edit_index: i32) -> Result<()> {
        self.entry_mut(key)?.edit_index = edit_index;
        Ok(())
    }

    pub fn set_multi_page_index(&mut self, key: &str, multi_page_index: i32) -> Result<()> {
        self.entry_mut(key)?.multi_page_index = multi_page_index;
        Ok(())
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut RepeatingGroup> {
        self.groups
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownGroup(key.to_string()))
    }

    /// Splits `key` into its repeating group definition and the `-r1-r2` suffix.
    fn resolve_key<'l, 'k>(&self, key: &'k str, layout: &'l Layout) -> Result<(&'l ComponentDef, &'k str)> {
        let base = match self.groups.get(key).and_then(|g| g.base_group_id.as_deref()) {
            Some(base) if key.starts_with(base) => &key[..base.len()],
            _ => key,
        };
        let def = layout
            .get(base)
            .filter(|def| def.is_repeating_group())
            .ok_or_else(|| EngineError::UnknownGroup(key.to_string()))?;
        Ok((def, &key[base.len()..]))
    }
}

/// Repeating groups directly below `def`, looking through non-repeating containers.
fn repeating_children<'l>(layout: &'l Layout, def: &ComponentDef) -> Vec<&'l ComponentDef> {
    let mut found = Vec::new();
    let mut stack: Vec<&ComponentDef> = def.child_refs().filter_map(|c| layout.get(c.id)).collect();
    stack.reverse();
    let mut seen = vec![def.id.as_str()];
    while let Some(child) = stack.pop() {
        if seen.contains(&child.id.as_str()) {
            continue;
        }
        seen.push(child.id.as_str());
        if child.is_repeating_group() {
            found.push(child);
        } else if child.is_group() {
            let mut inner: Vec<_> = child.child_refs().filter_map(|c| layout.get(c.id)).collect();
            inner.reverse();
            stack.extend(inner);
        }
    }
    found
}

/// Every repeating group at any depth below `def`.
fn repeating_descendants<'l>(layout: &'l Layout, def: &ComponentDef) -> Vec<&'l ComponentDef> {
    let mut found: Vec<&ComponentDef> = Vec::new();
    let mut frontier = repeating_children(layout, def);
    while let Some(next) = frontier.pop() {
        if found.iter().any(|f| f.id == next.id) || next.id == def.id {
            continue;
        }
        frontier.extend(repeating_children(layout, next));
        found.push(next);
    }
    found
}

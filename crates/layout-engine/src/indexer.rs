//! Derives repeating-group row counts from the keys of a data record.

use layout_model::{ComponentDef, DataModelPath, FormData, Layout};
use tracing::debug;

use crate::error::Result;
use crate::repeating::{RepeatingGroup, RepeatingGroups, group_key};
use crate::transpose::transpose_path;

/// Walks the layout from its top-level components and records, for every repeating
/// group under every parent row, the highest row index present in `record`.
pub fn repeating_groups_from_record(layout: &Layout, record: &FormData) -> RepeatingGroups {
    let keys: Vec<DataModelPath> = record
        .keys()
        .filter_map(|key| DataModelPath::parse(key).ok())
        .collect();
    let mut indexer = Indexer {
        layout,
        keys: &keys,
        visiting: Vec::new(),
        groups: RepeatingGroups::new(),
    };
    for def in layout.top_level() {
        indexer.visit(def, &[], None);
    }
    debug!(groups = indexer.groups.len(), "indexed repeating groups");
    indexer.groups
}

struct Indexer<'a> {
    layout: &'a Layout,
    keys: &'a [DataModelPath],
    visiting: Vec<&'a str>,
    groups: RepeatingGroups,
}

impl<'a> Indexer<'a> {
    /// `scope` is the concrete path of the innermost enclosing row, e.g. `Group1[1]`.
    fn visit(&mut self, def: &'a ComponentDef, rows: &[usize], scope: Option<&DataModelPath>) {
        if !def.is_group() || self.visiting.contains(&def.id.as_str()) {
            return;
        }
        self.visiting.push(&def.id);

        if def.is_repeating_group() {
            let concrete = def
                .group_binding()
                .and_then(|binding| DataModelPath::parse(binding).ok())
                .map(|path| match scope {
                    Some(scope) => transpose_path(scope, &path),
                    None => path,
                });
            let last = concrete
                .as_ref()
                .and_then(|path| self.keys.iter().filter_map(|key| path.row_index_in(key)).max());

            let mut entry = RepeatingGroup::empty_for(def, !rows.is_empty());
            entry.index = last.map_or(-1, |last| i32::try_from(last).unwrap_or(i32::MAX));
            self.groups.insert(group_key(&def.id, rows), entry);

            // Rows at or beyond maxCount are never built, so their nested groups need no state.
            let stop = last
                .map_or(0, |last| last.saturating_add(1))
                .min(def.max_count.map_or(usize::MAX, |max| max as usize));
            for row in 0..stop {
                let row_scope = concrete.clone().map(|mut path| {
                    let position = path.len() - 1;
                    path.set_index(position, Some(row));
                    path
                });
                let mut chain = rows.to_vec();
                chain.push(row);
                self.visit_children(def, &chain, row_scope.as_ref().or(scope));
            }
        } else {
            self.visit_children(def, rows, scope);
        }

        self.visiting.pop();
    }

    fn visit_children(&mut self, def: &'a ComponentDef, rows: &[usize], scope: Option<&DataModelPath>) {
        for child in def.child_refs() {
            if let Some(child) = self.layout.get(child.id) {
                self.visit(child, rows, scope);
            }
        }
    }
}

/// Removes every key under `group_path[index]` from `record`.
///
/// `group_path` is a concrete group path such as `Group1[1].Group2`. With `shift`, keys
/// of later rows are renamed one row down and keep their values.
pub fn remove_group_data(record: &FormData, group_path: &str, index: usize, shift: bool) -> Result<FormData> {
    let group = DataModelPath::parse(group_path)?;
    let position = group.len() - 1;
    let mut out = FormData::new();
    for (key, value) in record {
        let Ok(mut path) = DataModelPath::parse(key) else {
            out.insert(key.clone(), value.clone());
            continue;
        };
        match group.row_index_in(&path) {
            Some(row) if row == index => {}
            Some(row) if shift && row > index => {
                path.set_index(position, Some(row - 1));
                out.insert(path.to_string(), value.clone());
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(keys: &[&str]) -> FormData {
        keys.iter().map(|key| ((*key).to_string(), json!("x"))).collect()
    }

    #[test]
    fn remove_data_drops_row_and_shifts_later_rows() {
        let mut data = record(&["Group[0].a", "Group[1].a", "Group[2].a", "Other"]);
        data.insert("Group[2].b".to_string(), json!("kept"));

        let shifted = remove_group_data(&data, "Group", 1, true).unwrap();
        let keys: Vec<_> = shifted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Group[0].a", "Group[1].a", "Group[1].b", "Other"]);
        assert_eq!(shifted.get("Group[1].b"), Some(&json!("kept")));

        let unshifted = remove_group_data(&data, "Group", 1, false).unwrap();
        assert!(unshifted.contains_key("Group[2].a"));
        assert!(!unshifted.contains_key("Group[1].a"));
    }

    #[test]
    fn remove_data_respects_parent_rows() {
        let data = record(&["G1[0].G2[0].a", "G1[1].G2[0].a", "G1[1].G2[1].a"]);
        let out = remove_group_data(&data, "G1[1].G2", 0, true).unwrap();
        let keys: Vec<_> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["G1[0].G2[0].a", "G1[1].G2[0].a"]);
    }
}

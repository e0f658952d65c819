//! Data-model path transposition.
//!
//! An abstract path like `Group2.Nested.Age` is rewritten with the row indices of a
//! concrete reference path (`Group2[2].Nested[2]`). Segments are compared on whole names,
//! and an index already present on the input is never overwritten; once one is found the
//! walk stops, so references into other rows stay as written.

use layout_model::DataModelPath;

use crate::node::NodeRef;

/// Copies row indices from `ours` onto `theirs` where their segment names line up.
pub fn transpose_path(ours: &DataModelPath, theirs: &DataModelPath) -> DataModelPath {
    let mut out = theirs.clone();
    for (position, segment) in ours.segments().iter().enumerate() {
        let Some(target) = theirs.get(position) else {
            break;
        };
        if target.name != segment.name {
            break;
        }
        let Some(index) = segment.index else {
            continue;
        };
        if target.index.is_some() {
            break;
        }
        out.set_index(position, Some(index));
    }
    out
}

/// String form of [`transpose_path`]. Unparseable input comes back unchanged.
pub fn transpose_str(ours: &DataModelPath, theirs: &str) -> String {
    match DataModelPath::parse(theirs) {
        Ok(path) => transpose_path(ours, &path).to_string(),
        Err(_) => theirs.to_string(),
    }
}

/// Transposes `data_model` relative to `node`.
///
/// The reference point is the node's first binding. Nodes without bindings defer to their
/// parent, passing along their own row index so the parent group can fill in its row.
pub fn transpose_for_node(node: NodeRef<'_>, data_model: &str, row_index: Option<usize>) -> String {
    let Some(binding) = node.item().first_binding() else {
        return match node.parent() {
            Some(parent) => transpose_for_node(parent, data_model, node.row_index()),
            None => data_model.to_string(),
        };
    };
    let Ok(mut ours) = DataModelPath::parse(binding) else {
        return data_model.to_string();
    };
    if node.is_group() {
        let last = ours.len() - 1;
        ours.set_index(last, row_index);
    }
    transpose_str(&ours, data_model)
}

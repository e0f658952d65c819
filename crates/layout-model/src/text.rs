//! Text resources and the `[{n}]` row markers used by per-row variables and mappings.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::path::DataModelPath;

static INDEX_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\{\d+\}\]").expect("index marker pattern is valid"));

pub fn contains_index_marker(key: &str) -> bool {
    INDEX_MARKER.is_match(key)
}

/// Replaces the first `[{n}]` marker in `key` with `[index]`.
pub fn replace_first_index_marker(key: &str, index: usize) -> String {
    INDEX_MARKER
        .replacen(key, 1, format!("[{index}]").as_str())
        .into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResourceVariable {
    pub key: String,
    pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResource {
    pub id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<TextResourceVariable>,
}

impl TextResource {
    /// True when one of the resource's data-model variables carries a row marker
    /// directly on `group_path`, e.g. `People[{0}].Name` for the group `People`.
    pub fn has_index_variable_for(&self, group_path: &DataModelPath) -> bool {
        self.variables.iter().any(|variable| {
            if !variable.data_source.starts_with("dataModel")
                || !contains_index_marker(&variable.key)
            {
                return false;
            }
            let marked = INDEX_MARKER.replace_all(&variable.key, "[0]");
            let Ok(path) = DataModelPath::parse(&marked) else {
                return false;
            };
            let position = group_path.len().saturating_sub(1);
            group_path.is_name_prefix_of(&path)
                && path.len() > group_path.len()
                && path.get(position).is_some_and(|s| s.index.is_some())
        })
    }
}

/// Text resources indexed by id.
#[derive(Debug, Clone, Default)]
pub struct TextResources {
    resources: Vec<TextResource>,
    by_id: HashMap<String, usize>,
}

impl TextResources {
    pub fn new(resources: Vec<TextResource>) -> Self {
        let by_id = resources
            .iter()
            .enumerate()
            .map(|(position, resource)| (resource.id.clone(), position))
            .collect();
        Self { resources, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&TextResource> {
        self.by_id.get(id).map(|&position| &self.resources[position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextResource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

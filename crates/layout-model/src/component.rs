//! Component definitions as they appear in a flat layout document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expression::PropertyValue;

/// Component types that act as containers for other components.
pub const GROUP_TYPES: [&str; 2] = ["Group", "RepeatingGroup"];

/// Binding name holding a group's data-model path.
pub const GROUP_BINDING: &str = "group";

/// One entry of a flat layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub id: String,

    #[serde(rename = "type")]
    pub component_type: String,

    /// Child ids in declared order. Multi-page groups prefix each id with `<page>:`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_model_bindings: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<GroupEdit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<PanelConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<PropertyValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub text_resource_bindings: BTreeMap<String, PropertyValue>,

    /// Data-model keys with `[{n}]` row markers, mapped to option/query parameter names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, String>>,

    /// Every other declared property, literal or expression.
    #[serde(flatten)]
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Edit settings for a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_page: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<FilterEntry>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKey {
    Start,
    Stop,
}

/// A `start`/`stop` bound restricting which rows of a group are surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub key: FilterKey,
    pub value: String,
}

/// Panel settings. A panel with a group reference is never expanded into rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_reference: Option<GroupReference>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReference {
    pub group: String,
}

/// A resolved entry of a group's `children` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef<'a> {
    pub id: &'a str,
    pub multi_page_index: Option<usize>,
}

impl ComponentDef {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            children: Vec::new(),
            data_model_bindings: BTreeMap::new(),
            max_count: None,
            edit: None,
            panel: None,
            hidden: None,
            text_resource_bindings: BTreeMap::new(),
            mapping: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        GROUP_TYPES.contains(&self.component_type.as_str())
    }

    pub fn is_panel_reference(&self) -> bool {
        self.panel
            .as_ref()
            .is_some_and(|panel| panel.group_reference.is_some())
    }

    /// A group whose children are duplicated once per data row.
    pub fn is_repeating_group(&self) -> bool {
        self.is_group() && !self.is_panel_reference() && self.max_count.is_some_and(|max| max > 1)
    }

    pub fn is_multi_page(&self) -> bool {
        self.edit
            .as_ref()
            .and_then(|edit| edit.multi_page)
            .unwrap_or(false)
    }

    pub fn group_binding(&self) -> Option<&str> {
        self.data_model_bindings
            .get(GROUP_BINDING)
            .map(String::as_str)
    }

    /// Children in declared order, with multi-page prefixes split off.
    pub fn child_refs(&self) -> impl Iterator<Item = ChildRef<'_>> {
        let multi_page = self.is_multi_page();
        self.children.iter().map(move |raw| {
            if multi_page
                && let Some((page, id)) = raw.split_once(':')
                && let Ok(index) = page.trim().parse::<usize>()
            {
                return ChildRef {
                    id,
                    multi_page_index: Some(index),
                };
            }
            ChildRef {
                id: raw.as_str(),
                multi_page_index: None,
            }
        })
    }

    /// The `start` (inclusive) and `stop` (exclusive) row bounds from `edit.filter`.
    pub fn filter_bounds(&self) -> (Option<usize>, Option<usize>) {
        let Some(edit) = &self.edit else {
            return (None, None);
        };
        let bound = |key: FilterKey| {
            edit.filter
                .iter()
                .find(|entry| entry.key == key)
                .and_then(|entry| entry.value.trim().parse::<usize>().ok())
        };
        (bound(FilterKey::Start), bound(FilterKey::Stop))
    }

    /// True when the component is marked `required`, either literally or through an
    /// expression that may evaluate to true.
    pub fn may_be_required(&self) -> bool {
        match self.properties.get("required") {
            Some(PropertyValue::Literal(value)) => value.as_bool().unwrap_or(false),
            Some(PropertyValue::Expression(_)) => true,
            None => false,
        }
    }
}

//! Flat layouts and named sets of layouts.
//!
//! A layout is kept exactly as declared (a flat list) plus an id index, so that any
//! component can be looked up in constant time while building the hierarchy.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::component::ComponentDef;
use crate::error::{ModelError, Result};

/// One form page as a flat, ordered list of component definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    components: Vec<ComponentDef>,
    by_id: HashMap<String, usize>,
}

impl Layout {
    pub fn new(components: Vec<ComponentDef>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(components.len());
        for (position, component) in components.iter().enumerate() {
            if by_id.insert(component.id.clone(), position).is_some() {
                return Err(ModelError::DuplicateId {
                    id: component.id.clone(),
                });
            }
        }
        Ok(Self { components, by_id })
    }

    /// Accepts either a bare component array or a layout file of the form
    /// `{"data": {"layout": [...]}}`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let list = match value {
            Value::Array(_) => value,
            Value::Object(object) => object
                .get("data")
                .and_then(|data| data.get("layout"))
                .ok_or_else(|| ModelError::InvalidLayout("missing 'data.layout'".to_string()))?,
            other => {
                return Err(ModelError::InvalidLayout(format!(
                    "expected an array or object, got {other}"
                )));
            }
        };
        let components: Vec<ComponentDef> = serde_json::from_value(list.clone())
            .map_err(|error| ModelError::InvalidLayout(error.to_string()))?;
        Self::new(components)
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDef> {
        self.by_id.get(id).map(|&position| &self.components[position])
    }

    pub fn components(&self) -> &[ComponentDef] {
        &self.components
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentDef> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components not referenced as a child of any group, in declared order.
    pub fn top_level(&self) -> Vec<&ComponentDef> {
        let referenced: HashSet<&str> = self
            .components
            .iter()
            .filter(|c| c.is_group())
            .flat_map(|c| c.child_refs().map(|child| child.id))
            .collect();
        self.components
            .iter()
            .filter(|c| !referenced.contains(c.id.as_str()))
            .collect()
    }

    pub fn has_required_fields(&self) -> bool {
        self.components.iter().any(ComponentDef::may_be_required)
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a ComponentDef;
    type IntoIter = std::slice::Iter<'a, ComponentDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.components.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Named layouts (one per page) in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSet {
    pages: Vec<(String, Layout)>,
}

impl LayoutSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page, replacing any existing page with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, layout: Layout) {
        let name = name.into();
        if let Some(slot) = self.pages.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = layout;
        } else {
            self.pages.push((name, layout));
        }
    }

    #[must_use]
    pub fn with_page(mut self, name: impl Into<String>, layout: Layout) -> Self {
        self.insert(name, layout);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.pages
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, layout)| layout)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Layout)> {
        self.pages
            .iter()
            .map(|(name, layout)| (name.as_str(), layout))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

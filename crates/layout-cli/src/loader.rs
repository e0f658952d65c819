//! Reads layouts, records and expression data sources from JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use layout_engine::InstanceContext;
use layout_model::{FormData, Layout, LayoutSet, TextResource, TextResources, flatten_object};
use serde_json::Value;
use tracing::{debug, info};

/// Loads layouts from a directory of `*.json` page files or from a single file.
///
/// In a directory every file is one page named after its file stem, in file name order.
/// A single file is either one layout (page named after the file stem) or an object
/// mapping page names to layouts.
pub fn load_layouts(path: &Path) -> Result<LayoutSet> {
    let mut set = LayoutSet::new();
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("read {}", path.display()))? {
            let file = entry?.path();
            if file.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
                files.push(file);
            }
        }
        files.sort();
        for file in files {
            let value = read_json(&file)?;
            let layout = Layout::from_json(&value)
                .with_context(|| format!("parse layout {}", file.display()))?;
            set.insert(page_name(&file), layout);
        }
    } else {
        let value = read_json(path)?;
        if is_single_layout(&value) {
            let layout = Layout::from_json(&value)
                .with_context(|| format!("parse layout {}", path.display()))?;
            set.insert(page_name(path), layout);
        } else if let Value::Object(pages) = value {
            for (name, page) in &pages {
                let layout =
                    Layout::from_json(page).with_context(|| format!("parse page '{name}'"))?;
                set.insert(name.clone(), layout);
            }
        }
    }
    if set.is_empty() {
        bail!("no layouts found in {}", path.display());
    }
    info!(pages = set.len(), "loaded layouts");
    Ok(set)
}

/// Loads a record. Nested objects are flattened to dotted keys; already-flat keys pass
/// through unchanged.
pub fn load_record(path: &Path) -> Result<FormData> {
    let value = read_json(path)?;
    if !value.is_object() {
        bail!("{} must contain a JSON object", path.display());
    }
    let record = flatten_object(&value);
    debug!(fields = record.len(), "loaded record");
    Ok(record)
}

pub fn load_instance_context(path: &Path) -> Result<InstanceContext> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("parse instance {}", path.display()))
}

pub fn load_settings(path: &Path) -> Result<BTreeMap<String, Value>> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("parse settings {}", path.display()))
}

/// Loads text resources from either a bare array or a `{"resources": [...]}` file.
pub fn load_text_resources(path: &Path) -> Result<TextResources> {
    let mut value = read_json(path)?;
    if let Some(resources) = value.get_mut("resources") {
        value = resources.take();
    }
    let resources: Vec<TextResource> = serde_json::from_value(value)
        .with_context(|| format!("parse text resources {}", path.display()))?;
    Ok(TextResources::new(resources))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse JSON in {}", path.display()))
}

fn is_single_layout(value: &Value) -> bool {
    value.is_array() || value.get("data").is_some()
}

fn page_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

//! Load, index, build and resolve in one pass.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use layout_engine::{
    BuildOptions, BuiltinEvaluator, DataSources, LayoutPages, RepeatingGroups, ResolveRequest,
    resolved_layouts,
};
use tracing::{info, info_span, warn};

use crate::loader::{
    load_instance_context, load_layouts, load_record, load_settings, load_text_resources,
};

/// Input files and options for one resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolveInputs {
    pub layouts: PathBuf,
    pub data: PathBuf,
    pub page: Option<String>,
    pub instance: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub texts: Option<PathBuf>,
    pub hidden: Vec<String>,
    pub options: BuildOptions,
}

#[derive(Debug)]
pub struct ResolveOutcome {
    pub groups: RepeatingGroups,
    pub pages: LayoutPages,
}

impl ResolveOutcome {
    pub fn warning_count(&self) -> usize {
        self.pages.all().iter().map(|page| page.warnings().len()).sum()
    }
}

/// Derives the repeating-group state from the record without building any tree.
pub fn derive_groups(layouts: &Path, data: &Path) -> Result<RepeatingGroups> {
    let set = load_layouts(layouts)?;
    let record = load_record(data)?;
    let groups = RepeatingGroups::from_layouts(&set, &record);
    info!(groups = groups.len(), "derived repeating groups");
    Ok(groups)
}

pub fn resolve_form(inputs: &ResolveInputs) -> Result<ResolveOutcome> {
    let span = info_span!("resolve", layouts = %inputs.layouts.display());
    let _guard = span.enter();

    let set = load_layouts(&inputs.layouts)?;
    let record = load_record(&inputs.data)?;
    let groups = RepeatingGroups::from_layouts(&set, &record);
    info!(groups = groups.len(), "derived repeating groups");

    let mut sources = DataSources::new(record).with_hidden_fields(inputs.hidden.iter().cloned());
    if let Some(path) = &inputs.instance {
        sources = sources.with_instance_context(load_instance_context(path)?);
    }
    if let Some(path) = &inputs.settings {
        sources = sources.with_application_settings(load_settings(path)?);
    }
    let texts = inputs.texts.as_deref().map(load_text_resources).transpose()?;

    // Without an explicit page the first one is shown.
    let current = inputs
        .page
        .clone()
        .or_else(|| set.names().next().map(str::to_string));
    let request = ResolveRequest {
        layouts: &set,
        current_page: current.as_deref(),
        groups: &groups,
        text_resources: texts.as_ref(),
        sources: &sources,
        options: &inputs.options,
    };
    let pages = resolved_layouts(&request, &BuiltinEvaluator).context("resolve layouts")?;

    let outcome = ResolveOutcome { groups, pages };
    let warnings = outcome.warning_count();
    if warnings > 0 {
        warn!(warnings, "layouts built with warnings");
    }
    info!(pages = outcome.pages.all().len(), "resolved layouts");
    Ok(outcome)
}

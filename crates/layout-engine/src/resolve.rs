//! Replaces expression-valued properties with their evaluated literals.
//!
//! Every node is evaluated against the tree as built before any result is written back,
//! so an expression never sees a mix of resolved and unresolved siblings.

use layout_model::{LayoutSet, PropertyValue, TextResources};
use serde_json::Value;
use tracing::debug;

use crate::error::{EngineError, ExprError, Result};
use crate::expr::{ExprContext, ExpressionEvaluator};
use crate::node::{NodeChildren, NodeId, NodeItem, NodeRef};
use crate::options::BuildOptions;
use crate::page::LayoutPage;
use crate::pages::{LayoutPages, build_pages};
use crate::repeating::RepeatingGroups;
use crate::sources::DataSources;
use crate::texts::rewrite_all_text_resource_bindings;

/// Name of the group property evaluated once per row, in the context of the row's
/// first item.
const HIDDEN_ROW: &str = "hiddenRow";

struct NodeUpdate {
    id: NodeId,
    item: Option<NodeItem>,
    hidden_rows: Vec<(usize, bool)>,
}

/// Resolves a standalone page.
pub fn resolve_page(page: &mut LayoutPage, sources: &DataSources, evaluator: &dyn ExpressionEvaluator) -> Result<()> {
    let updates = compute_updates(page, None, sources, evaluator)?;
    apply_updates(page, updates);
    Ok(())
}

/// Resolves every page of a collection. Expressions may reach components on other pages.
pub fn resolve_pages(pages: &mut LayoutPages, sources: &DataSources, evaluator: &dyn ExpressionEvaluator) -> Result<()> {
    let mut all_updates = Vec::with_capacity(pages.all().len());
    for page in pages.all() {
        all_updates.push(compute_updates(page, Some(pages), sources, evaluator)?);
    }
    for (position, updates) in all_updates.into_iter().enumerate() {
        if let Some(page) = pages.page_mut(position) {
            apply_updates(page, updates);
        }
    }
    Ok(())
}

/// Everything needed to turn flat layouts into resolved pages.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub layouts: &'a LayoutSet,
    pub current_page: Option<&'a str>,
    pub groups: &'a RepeatingGroups,
    pub text_resources: Option<&'a TextResources>,
    pub sources: &'a DataSources,
    pub options: &'a BuildOptions,
}

/// Builds and resolves all pages of a form in one go, then suffixes per-row text
/// resource ids.
pub fn resolved_layouts(request: &ResolveRequest<'_>, evaluator: &dyn ExpressionEvaluator) -> Result<LayoutPages> {
    let mut pages = build_pages(request.layouts, request.current_page, request.groups, request.options)?;
    resolve_pages(&mut pages, request.sources, evaluator)?;
    if request.options.rewrite_text_resources
        && let Some(resources) = request.text_resources
    {
        rewrite_all_text_resource_bindings(&mut pages, resources);
    }
    Ok(pages)
}

fn compute_updates(
    page: &LayoutPage,
    pages: Option<&LayoutPages>,
    sources: &DataSources,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<Vec<NodeUpdate>> {
    let mut updates = Vec::new();
    for node in page.flat_in(true, pages) {
        let ctx = ExprContext::new(node, sources);
        let item = resolve_item(node.item(), &ctx, evaluator).map_err(|source| EngineError::Expression {
            node: node.id().to_string(),
            source,
        })?;
        let hidden_rows = resolve_hidden_rows(node, sources, evaluator)?;
        if item.is_some() || !hidden_rows.is_empty() {
            updates.push(NodeUpdate {
                id: node.node_id(),
                item,
                hidden_rows,
            });
        }
    }
    debug!(page = page.name(), updated = updates.len(), "resolved expressions");
    Ok(updates)
}

/// A resolved copy of `item`, or `None` when it holds no expressions.
fn resolve_item(
    item: &NodeItem,
    ctx: &ExprContext<'_>,
    evaluator: &dyn ExpressionEvaluator,
) -> std::result::Result<Option<NodeItem>, ExprError> {
    if !item.has_expressions() {
        return Ok(None);
    }
    let mut resolved = item.clone();
    // Per-row results end up on the rows themselves.
    if resolved.property(HIDDEN_ROW).is_some_and(PropertyValue::is_expression) {
        resolved.properties.remove(HIDDEN_ROW);
    }
    for value in resolved.dynamic_values_mut() {
        if let PropertyValue::Expression(expr) = value {
            let literal = evaluator.evaluate(expr, ctx)?;
            *value = PropertyValue::Literal(literal);
        }
    }
    Ok(Some(resolved))
}

fn resolve_hidden_rows(
    node: NodeRef<'_>,
    sources: &DataSources,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<Vec<(usize, bool)>> {
    let Some(PropertyValue::Expression(expr)) = node.item().property(HIDDEN_ROW) else {
        return Ok(Vec::new());
    };
    let mut hidden = Vec::new();
    for (position, row) in node.rows().iter().enumerate() {
        let Some(first) = row.items.first() else {
            continue;
        };
        let Some(context_node) = node.page().node_in(*first, node.pages()) else {
            continue;
        };
        let value = evaluator
            .evaluate(expr, &ExprContext::new(context_node, sources))
            .map_err(|source| EngineError::Expression {
                node: context_node.id().to_string(),
                source,
            })?;
        hidden.push((position, matches!(value, Value::Bool(true))));
    }
    Ok(hidden)
}

fn apply_updates(page: &mut LayoutPage, updates: Vec<NodeUpdate>) {
    for update in updates {
        let node = page.node_at_mut(update.id);
        if let Some(item) = update.item {
            node.item = item;
        }
        if let NodeChildren::Rows(rows) = &mut node.children {
            for (position, hidden) in update.hidden_rows {
                if let Some(row) = rows.get_mut(position) {
                    row.hidden = Some(hidden);
                }
            }
        }
    }
}

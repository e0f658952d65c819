//! Collections of built pages.

use layout_model::LayoutSet;

use crate::error::Result;
use crate::hierarchy::HierarchyBuilder;
use crate::node::{NodeId, NodeRef};
use crate::options::BuildOptions;
use crate::page::LayoutPage;
use crate::repeating::RepeatingGroups;

/// Every page of a form, with the page currently shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPages {
    current: Option<String>,
    pages: Vec<LayoutPage>,
}

impl LayoutPages {
    pub fn new(current: Option<String>, pages: Vec<LayoutPage>) -> Self {
        Self { current, pages }
    }

    /// The current page, falling back to the first page when the current name is
    /// unknown. `None` when no current page was ever set.
    pub fn current(&self) -> Option<&LayoutPage> {
        let name = self.current.as_deref()?;
        self.find_layout(name).or_else(|| self.pages.first())
    }

    pub fn find_layout(&self, name: &str) -> Option<&LayoutPage> {
        self.pages.iter().find(|page| page.name() == name)
    }

    pub fn all(&self) -> &[LayoutPage] {
        &self.pages
    }

    pub fn iter_except<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LayoutPage> + 'a {
        self.pages.iter().filter(move |page| page.name() != name)
    }

    /// Pages in search order: the current page first, then the rest in page order.
    fn search_order(&self) -> impl Iterator<Item = &LayoutPage> {
        let current = self.current();
        current.into_iter().chain(
            self.pages
                .iter()
                .filter(move |page| current.is_none_or(|current| !std::ptr::eq(*page, current))),
        )
    }

    /// First node with `id` (resolved or declared), looking at the current page first.
    pub fn find_by_id(&self, id: &str) -> Option<NodeRef<'_>> {
        self.search_order()
            .find_map(|page| page.find_by_id_in(id, Some(self)))
    }

    /// Every node with `id` on every page, current page first.
    pub fn find_all_by_id(&self, id: &str) -> Vec<NodeRef<'_>> {
        self.search_order()
            .flat_map(|page| page.find_all_by_id_in(id, Some(self)))
            .collect()
    }

    /// A node handle able to reach across pages.
    pub fn node(&self, page: &str, id: NodeId) -> Option<NodeRef<'_>> {
        self.find_layout(page)?.node_in(id, Some(self))
    }

    pub(crate) fn page_mut(&mut self, position: usize) -> Option<&mut LayoutPage> {
        self.pages.get_mut(position)
    }
}

/// Builds every page of `layouts` against one shared state store.
pub fn build_pages(
    layouts: &LayoutSet,
    current: Option<&str>,
    groups: &RepeatingGroups,
    options: &BuildOptions,
) -> Result<LayoutPages> {
    let pages = layouts
        .iter()
        .map(|(name, layout)| {
            HierarchyBuilder::new(layout, groups)
                .with_options(options.clone())
                .build(name)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LayoutPages::new(current.map(str::to_string), pages))
}

//! Layout hierarchy and repeating-group resolution.
//!
//! Turns flat layouts plus a data record into resolved node trees:
//!
//! 1. [`indexer`] counts repeating-group rows from record keys into a
//!    [`RepeatingGroups`] state store.
//! 2. [`hierarchy`] expands every page into a [`LayoutPage`], cloning group children
//!    once per row and rewriting ids, bindings, text resources and mappings.
//! 3. [`resolve`] evaluates expression-valued properties through an
//!    [`ExpressionEvaluator`], after which [`texts`] suffixes per-row text resource ids.
//! 4. [`LayoutPages`] and [`NodeRef`] provide lookup and traversal.

pub mod error;
pub mod expr;
pub mod hierarchy;
pub mod indexer;
pub mod node;
pub mod options;
pub mod page;
pub mod pages;
pub mod repeating;
pub mod resolve;
pub mod sources;
pub mod texts;
pub mod transpose;

pub use error::{EngineError, ExprError, Result};
pub use expr::{BuiltinEvaluator, ExprContext, ExpressionEvaluator};
pub use hierarchy::{BuildWarning, HierarchyBuilder, has_required_fields, top_level_components};
pub use indexer::remove_group_data;
pub use node::{LayoutNode, NodeChildren, NodeId, NodeItem, NodeRef, Row};
pub use options::BuildOptions;
pub use page::LayoutPage;
pub use pages::{LayoutPages, build_pages};
pub use repeating::{RepeatingGroup, RepeatingGroups};
pub use resolve::{ResolveRequest, resolve_page, resolve_pages, resolved_layouts};
pub use sources::{DataSources, InstanceContext};
pub use texts::{rewrite_all_text_resource_bindings, rewrite_text_resource_bindings};

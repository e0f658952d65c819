//! Form layout model.
//!
//! This crate holds the input side of layout resolution:
//!
//! - **component**: component definitions as declared in a flat layout
//! - **layout**: flat layouts with an id index, and named sets of layouts
//! - **expression**: list-form expressions and literal-or-expression properties
//! - **path**: dotted/bracketed data-model paths
//! - **record**: form data records
//! - **text**: text resources and row markers

pub mod component;
pub mod error;
pub mod expression;
pub mod layout;
pub mod path;
pub mod record;
pub mod text;

pub use component::{ChildRef, ComponentDef, FilterEntry, FilterKey, GroupEdit, PanelConfig};
pub use error::{ModelError, Result};
pub use expression::{Expr, ExprFunction, PropertyValue};
pub use layout::{Layout, LayoutSet};
pub use path::{DataModelPath, PathSegment};
pub use record::{FormData, flatten_object};
pub use text::{TextResource, TextResourceVariable, TextResources};

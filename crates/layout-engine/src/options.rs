//! Build configuration.

use serde::{Deserialize, Serialize};

/// Options controlling how flat layouts are turned into node trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    /// Fail the build when a `children` entry references a missing component,
    /// instead of skipping it with a warning.
    pub strict_references: bool,

    /// Append row suffixes to text resource ids whose variables are bound to a
    /// repeating group.
    pub rewrite_text_resources: bool,

    /// Replace `[{n}]` markers in `mapping` keys with concrete row indices.
    pub rewrite_mappings: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_references: false,
            rewrite_text_resources: true,
            rewrite_mappings: true,
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn strict(mut self, enable: bool) -> Self {
        self.strict_references = enable;
        self
    }

    #[must_use]
    pub fn with_text_resource_rewrite(mut self, enable: bool) -> Self {
        self.rewrite_text_resources = enable;
        self
    }

    #[must_use]
    pub fn with_mapping_rewrite(mut self, enable: bool) -> Self {
        self.rewrite_mappings = enable;
        self
    }
}

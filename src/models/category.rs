//! Category tree data structure.

use serde::{Deserialize, Serialize};

/// A category (or subcategory) with at least one listed book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryNode {
    /// Display name, trimmed and never empty
    pub name: String,

    /// URL-safe identifier
    pub slug: String,

    /// Number of listings, always > 0
    pub count: u64,

    /// Subcategories ordered by name
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Find a direct child by slug.
    pub fn child(&self, slug: &str) -> Option<&CategoryNode> {
        self.children.iter().find(|c| c.slug == slug)
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::node_count).sum::<usize>()
    }
}

/// Find a top-level category by slug.
pub fn find_by_slug<'a>(categories: &'a [CategoryNode], slug: &str) -> Option<&'a CategoryNode> {
    categories.iter().find(|c| c.slug == slug)
}

//! Category filter state shared by listing pages.
//!
//! The filter mirrors the `category` and `subcategory` query parameters so a
//! filtered view can be bookmarked or shared.

use url::form_urlencoded;

use crate::models::{CategoryNode, ListingsRequest, find_by_slug};

const CATEGORY_PARAM: &str = "category";
const SUBCATEGORY_PARAM: &str = "subcategory";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    category: Option<String>,
    subcategory: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ListingFilter {
    pub fn new(category: Option<String>, subcategory: Option<String>) -> Self {
        let category = non_blank(category);
        // A subcategory only means something under a category
        let subcategory = category.as_ref().and(non_blank(subcategory));
        Self {
            category,
            subcategory,
        }
    }

    /// Resolve category slugs against the category tree.
    ///
    /// `None` if the category slug is unknown; an unknown subcategory slug is
    /// dropped.
    pub fn from_slugs(tree: &[CategoryNode], category: &str, subcategory: Option<&str>) -> Option<Self> {
        let node = find_by_slug(tree, category)?;
        let subcategory = subcategory
            .and_then(|slug| node.child(slug))
            .map(|child| child.name.clone());
        Some(Self::new(Some(node.name.clone()), subcategory))
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.subcategory.is_none()
    }

    /// Select a category. Returns true if the filter changed.
    ///
    /// Switching category drops the subcategory.
    pub fn set_category(&mut self, category: Option<String>) -> bool {
        let category = non_blank(category);
        if category == self.category {
            return false;
        }
        self.category = category;
        self.subcategory = None;
        true
    }

    /// Select a subcategory. Returns true if the filter changed.
    pub fn set_subcategory(&mut self, subcategory: Option<String>) -> bool {
        let subcategory = self.category.as_ref().and(non_blank(subcategory));
        if subcategory == self.subcategory {
            return false;
        }
        self.subcategory = subcategory;
        true
    }

    /// Parse from a query string, with or without the leading `?`.
    ///
    /// Unknown parameters are ignored.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut category = None;
        let mut subcategory = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                CATEGORY_PARAM => category = Some(value.into_owned()),
                SUBCATEGORY_PARAM => subcategory = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::new(category, subcategory)
    }

    /// Encode as a query string without the leading `?`. Empty when unfiltered.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.category {
            serializer.append_pair(CATEGORY_PARAM, category);
        }
        if let Some(subcategory) = &self.subcategory {
            serializer.append_pair(SUBCATEGORY_PARAM, subcategory);
        }
        serializer.finish()
    }

    /// Copy the filter onto `request`.
    pub fn apply(&self, request: ListingsRequest) -> ListingsRequest {
        request
            .with_category(self.category.clone())
            .with_subcategory(self.subcategory.clone())
    }
}

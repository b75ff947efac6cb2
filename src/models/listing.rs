//! Book listing data structures and listing requests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Money;

/// Well-known shelf identifiers understood by the upstream API.
pub mod shelves {
    pub const BEST_SELLERS: &str = "bestSellers";
    pub const POPULAR_BOOKS: &str = "popularBooks";
    pub const NEW_ARRIVALS: &str = "newArrivals";
    pub const CLEARANCE: &str = "clearance";
    pub const RECENTLY_VIEWED: &str = "recentlyViewed";
}

/// A normalized book listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: Money,
    /// Only set while an upstream discount is active
    pub discounted_price: Option<Money>,
    pub image_url: String,
    pub category: String,
    pub subcategory: String,
    pub condition: String,
    pub description: String,
    pub stock: u32,
    pub views: u64,
    pub purchases: u64,
    pub listed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub isbn: String,
}

impl Listing {
    /// Price the customer would pay right now.
    pub fn effective_price(&self) -> Money {
        self.discounted_price.unwrap_or(self.price)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Pagination metadata attached to a listings response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingsMeta {
    pub count: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
    /// True when the upstream sent no totals and these were inferred from the page
    #[serde(default)]
    pub estimated: bool,
}

impl ListingsMeta {
    /// Derive metadata when the upstream omits it.
    pub fn derived(count: u64, page: u32, limit: u32) -> Self {
        let pages = if limit == 0 {
            1
        } else {
            count.div_ceil(u64::from(limit)).max(1) as u32
        };
        Self {
            count,
            page,
            limit,
            pages,
            estimated: true,
        }
    }
}

/// Normalized result envelope of a listings fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingsResponse {
    pub success: bool,
    pub listings: Vec<Listing>,
    pub meta: ListingsMeta,
    /// Named sub-shelves returned alongside the main listing
    #[serde(default)]
    pub shelves: BTreeMap<String, Vec<Listing>>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// A logical book-listing request, serialized as the `POST /listings` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingsRequest {
    #[serde(default = "defaults::page")]
    pub page: u32,

    #[serde(default = "defaults::limit")]
    pub limit: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Loosely structured upstream filter criteria
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub include_archived: bool,

    #[serde(default = "defaults::sort")]
    pub sort: String,

    #[serde(default)]
    pub order: SortOrder,
}

impl Default for ListingsRequest {
    fn default() -> Self {
        Self {
            page: defaults::page(),
            limit: defaults::limit(),
            shelf: None,
            category: None,
            subcategory: None,
            search: None,
            filters: BTreeMap::new(),
            include_archived: false,
            sort: defaults::sort(),
            order: SortOrder::default(),
        }
    }
}

impl ListingsRequest {
    /// Request the first page of a named shelf.
    pub fn shelf(shelf: impl Into<String>) -> Self {
        Self {
            shelf: Some(shelf.into()),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_subcategory(mut self, subcategory: Option<String>) -> Self {
        self.subcategory = subcategory.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>, order: SortOrder) -> Self {
        self.sort = sort.into();
        self.order = order;
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }
}

mod defaults {
    pub fn page() -> u32 {
        1
    }
    pub fn limit() -> u32 {
        20
    }
    pub fn sort() -> String {
        "listedAt".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = ListingsRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 20);
        assert_eq!(req.sort, "listedAt");
        assert_eq!(req.order, SortOrder::Desc);
        assert!(!req.include_archived);
    }

    #[test]
    fn test_request_body_shape() {
        let req = ListingsRequest::shelf(shelves::BEST_SELLERS).with_limit(10);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["shelf"], "bestSellers");
        assert_eq!(body["limit"], 10);
        assert_eq!(body["includeArchived"], false);
        assert_eq!(body["order"], "desc");
        assert!(body.get("category").is_none());
    }

    #[test]
    fn test_derived_meta_rounds_pages_up() {
        assert_eq!(ListingsMeta::derived(41, 1, 20).pages, 3);
        assert_eq!(ListingsMeta::derived(0, 1, 20).pages, 1);
    }

    #[test]
    fn test_blank_category_is_dropped() {
        let req = ListingsRequest::default().with_category(Some("  ".into()));
        assert!(req.category.is_none());
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("ASC".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}

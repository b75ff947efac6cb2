//! Home page: a strip per featured shelf plus the category menu.

use crate::models::{CategoryNode, Listing, ListingsRequest, shelves};
use crate::services::Catalog;

/// Shelves on the home page, in display order.
pub const HOME_SHELVES: &[(&str, &str)] = &[
    (shelves::BEST_SELLERS, "Bestsellers"),
    (shelves::NEW_ARRIVALS, "New Arrivals"),
    (shelves::POPULAR_BOOKS, "Popular Books"),
    (shelves::CLEARANCE, "Clearance"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ShelfStrip {
    pub shelf: String,
    pub title: String,
    pub books: Vec<Listing>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomePage {
    pub strips: Vec<ShelfStrip>,
    pub categories: Vec<CategoryNode>,
}

impl HomePage {
    pub fn strip(&self, shelf: &str) -> Option<&ShelfStrip> {
        self.strips.iter().find(|s| s.shelf == shelf)
    }

    /// Load every strip concurrently with the category menu.
    ///
    /// A shelf that fails to load renders empty; the failure has already been
    /// reported through the catalog's notifier.
    pub async fn load(catalog: &Catalog, per_shelf: u32) -> Self {
        let requests: Vec<ListingsRequest> = HOME_SHELVES
            .iter()
            .map(|(shelf, _)| ListingsRequest::shelf(*shelf).with_limit(per_shelf))
            .collect();

        let (results, categories) = tokio::join!(
            catalog.fetch_shelves(&requests),
            catalog.fetch_categories_or_empty(None),
        );

        let strips = HOME_SHELVES
            .iter()
            .zip(results)
            .map(|((shelf, title), result)| {
                let books = match result {
                    // Some backends answer with a named shelf map instead of a flat list
                    Ok(Some(response)) => response
                        .shelves
                        .get(*shelf)
                        .filter(|books| !books.is_empty())
                        .unwrap_or(&response.listings)
                        .clone(),
                    Ok(None) | Err(_) => Vec::new(),
                };
                ShelfStrip {
                    shelf: shelf.to_string(),
                    title: title.to_string(),
                    books,
                }
            })
            .collect();

        Self { strips, categories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::QueryCache;
    use crate::services::catalog::tests::{FakeApi, listings_payload};
    use crate::services::notify::ToastQueue;

    #[tokio::test]
    async fn test_loads_every_strip() {
        let api = Arc::new(FakeApi::with_listings(listings_payload(3)));
        let toasts = Arc::new(ToastQueue::new());
        let catalog = Catalog::new(api, Arc::new(QueryCache::default()), toasts.clone());

        let home = HomePage::load(&catalog, 8).await;
        assert_eq!(home.strips.len(), HOME_SHELVES.len());
        assert_eq!(home.strip(shelves::CLEARANCE).unwrap().books.len(), 3);
        // Categories were unscripted and degrade to an empty menu
        assert!(home.categories.is_empty());
        assert_eq!(toasts.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_shelves_render_empty() {
        let api = Arc::new(FakeApi::default());
        let catalog = Catalog::new(api, Arc::new(QueryCache::default()), Arc::new(ToastQueue::new()));

        let home = HomePage::load(&catalog, 8).await;
        assert!(home.strips.iter().all(|s| s.books.is_empty()));
        assert_eq!(home.strips[0].title, "Bestsellers");
    }
}

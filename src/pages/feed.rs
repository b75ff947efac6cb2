//! "Load more" accumulation used by the category browser.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Listing, ListingsRequest};
use crate::pages::ListingFilter;
use crate::services::Catalog;

pub struct InfiniteFeed {
    catalog: Arc<Catalog>,
    base: ListingsRequest,
    filter: ListingFilter,
    limit: u32,
    next_page: u32,
    books: Vec<Listing>,
    has_more: bool,
    loading: bool,
    error: Option<String>,
}

impl InfiniteFeed {
    pub fn new(catalog: Arc<Catalog>, base: ListingsRequest, limit: u32) -> Self {
        Self {
            catalog,
            base,
            filter: ListingFilter::default(),
            limit: limit.max(1),
            next_page: 1,
            books: Vec::new(),
            has_more: true,
            loading: false,
            error: None,
        }
    }

    pub fn with_filter(mut self, filter: ListingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn books(&self) -> &[Listing] {
        &self.books
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the next page and append it. Returns how many books were added.
    ///
    /// A page shorter than the limit ends the feed. Failures leave the feed
    /// where it was so the same page can be retried.
    pub async fn load_more(&mut self) -> Result<usize> {
        if !self.has_more {
            return Ok(0);
        }

        let request = self
            .filter
            .apply(self.base.clone())
            .with_page(self.next_page)
            .with_limit(self.limit);

        self.loading = true;
        self.error = None;
        let result = self.catalog.fetch_listings(&request, None).await;
        self.loading = false;

        let response = match result {
            Ok(Some(response)) => response,
            Ok(None) => return Ok(0),
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        let fetched = response.listings.len();
        self.has_more = fetched == self.limit as usize;
        self.books.extend(response.listings.iter().cloned());
        self.next_page += 1;
        log::debug!(
            "feed page {} added {} books (more: {})",
            request.page,
            fetched,
            self.has_more
        );
        Ok(fetched)
    }

    /// Replace the filter. A change empties the feed and loads its first page.
    pub async fn set_filter(&mut self, filter: ListingFilter) -> Result<usize> {
        if filter == self.filter {
            return Ok(0);
        }
        self.filter = filter;
        self.reset();
        self.load_more().await
    }

    pub async fn set_category(&mut self, category: Option<String>) -> Result<usize> {
        let mut filter = self.filter.clone();
        filter.set_category(category);
        self.set_filter(filter).await
    }

    pub async fn set_subcategory(&mut self, subcategory: Option<String>) -> Result<usize> {
        let mut filter = self.filter.clone();
        filter.set_subcategory(subcategory);
        self.set_filter(filter).await
    }

    pub fn reset(&mut self) {
        self.next_page = 1;
        self.books.clear();
        self.has_more = true;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::services::QueryCache;
    use crate::services::catalog::tests::{FakeApi, listings_payload};
    use crate::services::notify::ToastQueue;

    fn feed(api: Arc<FakeApi>, limit: u32) -> InfiniteFeed {
        let catalog = Catalog::new(api, Arc::new(QueryCache::default()), Arc::new(ToastQueue::new()));
        InfiniteFeed::new(Arc::new(catalog), ListingsRequest::default(), limit)
    }

    #[tokio::test]
    async fn test_full_pages_keep_feed_open() {
        let api = Arc::new(FakeApi::with_listings(listings_payload(3)));
        let mut feed = feed(Arc::clone(&api), 3);

        assert_eq!(feed.load_more().await.unwrap(), 3);
        assert!(feed.has_more());
        assert_eq!(feed.load_more().await.unwrap(), 3);
        assert_eq!(feed.books().len(), 6);
        assert_eq!(api.listing_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_short_page_ends_feed() {
        let api = Arc::new(FakeApi::with_listings(listings_payload(2)));
        let mut feed = feed(Arc::clone(&api), 5);

        assert_eq!(feed.load_more().await.unwrap(), 2);
        assert!(!feed.has_more());
        assert_eq!(feed.books().len(), 2);

        assert_eq!(feed.load_more().await.unwrap(), 0);
        assert_eq!(api.listing_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_filter_change_resets() {
        let api = Arc::new(FakeApi::with_listings(listings_payload(2)));
        let mut feed = feed(Arc::clone(&api), 5);
        feed.load_more().await.unwrap();
        assert!(!feed.has_more());

        feed.set_category(Some("Poetry".into())).await.unwrap();
        assert_eq!(feed.books().len(), 2);
        assert_eq!(feed.filter().category(), Some("Poetry"));
        assert_eq!(api.listing_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_position() {
        let api = Arc::new(FakeApi::default());
        let mut feed = feed(Arc::clone(&api), 2);
        assert!(feed.load_more().await.is_err());
        assert!(feed.error().is_some());
        assert!(feed.has_more());

        *api.listings.lock().unwrap() = Some(listings_payload(2));
        assert_eq!(feed.load_more().await.unwrap(), 2);
        assert_eq!(feed.error(), None);
    }
}

//! Page-number pagination for shelf pages.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Listing, ListingsMeta, ListingsRequest};
use crate::pages::ListingFilter;
use crate::services::Catalog;

/// State of one paginated listing page (bestsellers, clearance, ...).
pub struct PagedView {
    catalog: Arc<Catalog>,
    base: ListingsRequest,
    filter: ListingFilter,
    page: u32,
    page_size: u32,
    assumed_total: Option<u64>,
    loading: bool,
    books: Vec<Listing>,
    total_pages: u32,
    error: Option<String>,
}

fn pages_for(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX).max(1)
}

impl PagedView {
    /// `base` carries the shelf and sort; page, limit and filter are managed here.
    pub fn new(catalog: Arc<Catalog>, base: ListingsRequest, page_size: u32) -> Self {
        Self {
            catalog,
            base,
            filter: ListingFilter::default(),
            page: 1,
            page_size: page_size.max(1),
            assumed_total: None,
            loading: false,
            books: Vec::new(),
            total_pages: 1,
            error: None,
        }
    }

    /// Total to paginate against when the upstream does not report one.
    pub fn with_assumed_total(mut self, total: u64) -> Self {
        self.assumed_total = Some(total);
        self
    }

    pub fn with_filter(mut self, filter: ListingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn books(&self) -> &[Listing] {
        &self.books
    }

    pub fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    /// Message for the inline error panel, if the last load failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Request for the current page and filter.
    pub fn request(&self) -> ListingsRequest {
        self.filter
            .apply(self.base.clone())
            .with_page(self.page)
            .with_limit(self.page_size)
    }

    fn update_total(&mut self, meta: &ListingsMeta) {
        let total = match (meta.estimated, self.assumed_total) {
            (true, Some(assumed)) => assumed,
            _ => meta.count,
        };
        self.total_pages = pages_for(total, self.page_size).max(self.page);
    }

    /// Fetch the current page.
    ///
    /// On failure the error is kept for [`error`](Self::error) and also returned.
    /// A cancelled fetch leaves the view as it was.
    pub async fn load(&mut self) -> Result<()> {
        let request = self.request();
        self.loading = true;
        self.error = None;
        let result = self.catalog.fetch_listings(&request, None).await;
        self.loading = false;

        match result {
            Ok(Some(response)) => {
                self.books = response.listings.clone();
                self.update_total(&response.meta);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.books.clear();
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Load the same page again after a failure.
    pub async fn retry(&mut self) -> Result<()> {
        self.load().await
    }

    /// Jump to `page`, clamped to the known range.
    pub async fn go_to(&mut self, page: u32) -> Result<()> {
        self.page = page.clamp(1, self.total_pages.max(1));
        self.load().await
    }

    pub async fn next_page(&mut self) -> Result<()> {
        if !self.has_next() {
            return Ok(());
        }
        self.go_to(self.page + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<()> {
        if !self.has_previous() {
            return Ok(());
        }
        self.go_to(self.page - 1).await
    }

    /// Replace the filter. A change resets to page 1, drops the current books
    /// and reloads.
    pub async fn set_filter(&mut self, filter: ListingFilter) -> Result<()> {
        if filter == self.filter {
            return Ok(());
        }
        self.filter = filter;
        self.reset();
        self.load().await
    }

    pub async fn set_category(&mut self, category: Option<String>) -> Result<()> {
        let mut filter = self.filter.clone();
        filter.set_category(category);
        self.set_filter(filter).await
    }

    pub async fn set_subcategory(&mut self, subcategory: Option<String>) -> Result<()> {
        let mut filter = self.filter.clone();
        filter.set_subcategory(subcategory);
        self.set_filter(filter).await
    }

    fn reset(&mut self) {
        self.page = 1;
        self.total_pages = 1;
        self.books.clear();
        self.error = None;
    }
}

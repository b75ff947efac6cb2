// src/services/catalog.rs

//! Fetch facade for listings, categories and search.
//!
//! Every page consumer goes through [`Catalog`]. Failures are reported to
//! the [`Notifier`] and then returned to the caller, who decides how to
//! degrade. Cancellation is not a failure: it yields `None` or an empty list.

use std::sync::Arc;

use futures::future::join_all;

use crate::client::{StorefrontApi, endpoints};
use crate::error::{AppError, Result};
use crate::models::{CategoryNode, Listing, ListingsRequest, ListingsResponse};
use crate::services::cache::QueryCache;
use crate::services::normalize::{
    normalize_categories_payload, normalize_listings_payload, normalize_search_payload,
};
use crate::services::notify::{Notification, Notifier};
use crate::utils::{AbortSignal, abortable};

pub(crate) const SEARCH_FAILED: &str = "Search failed";

/// Service for reading the book catalogue.
#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn StorefrontApi>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl Catalog {
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Fetch a page of listings, served from cache while the entry is live.
    ///
    /// Returns `Ok(None)` when `signal` aborts before the response lands.
    pub async fn fetch_listings(
        &self,
        request: &ListingsRequest,
        signal: Option<&AbortSignal>,
    ) -> Result<Option<Arc<ListingsResponse>>> {
        let api = &self.api;
        let fetch = self.cache.get_or_fetch(request, || async move {
            let payload = api.listings(request).await?;
            normalize_listings_payload(endpoints::LISTINGS, &payload, request)
        });

        match abortable(signal, fetch).await {
            None => {
                log::debug!("listings request cancelled");
                Ok(None)
            }
            Some(Ok(response)) => Ok(Some(response)),
            Some(Err(e)) => {
                self.report("Could not load books", &e);
                Err(e)
            }
        }
    }

    /// Fetch several listing requests concurrently, results in request order.
    pub async fn fetch_shelves(
        &self,
        requests: &[ListingsRequest],
    ) -> Vec<Result<Option<Arc<ListingsResponse>>>> {
        join_all(requests.iter().map(|r| self.fetch_listings(r, None))).await
    }

    /// Fetch the category tree. Never cached.
    ///
    /// Returns an empty list when `signal` aborts.
    pub async fn fetch_categories(&self, signal: Option<&AbortSignal>) -> Result<Vec<CategoryNode>> {
        let fetch = async {
            let payload = self.api.categories().await?;
            normalize_categories_payload(endpoints::CATEGORIES, &payload)
        };

        match abortable(signal, fetch).await {
            None => {
                log::debug!("categories request cancelled");
                Ok(Vec::new())
            }
            Some(Ok(categories)) => Ok(categories),
            Some(Err(e)) => {
                self.report("Could not load categories", &e);
                Err(e)
            }
        }
    }

    /// Category tree, or an empty list if it could not be loaded.
    pub async fn fetch_categories_or_empty(&self, signal: Option<&AbortSignal>) -> Vec<CategoryNode> {
        self.fetch_categories(signal).await.unwrap_or_default()
    }

    /// Keyword search over the catalogue. Never cached.
    ///
    /// A blank query returns nothing without a network call.
    pub async fn search(&self, query: &str, signal: Option<&AbortSignal>) -> Result<Vec<Listing>> {
        self.search_unreported(query, signal)
            .await
            .inspect_err(|e| self.report(SEARCH_FAILED, e))
    }

    /// [`search`](Self::search) without notifying on failure.
    pub(crate) async fn search_unreported(
        &self,
        query: &str,
        signal: Option<&AbortSignal>,
    ) -> Result<Vec<Listing>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let fetch = async {
            let payload = self.api.search(query).await?;
            normalize_search_payload(endpoints::SEARCH, &payload)
        };

        match abortable(signal, fetch).await {
            None => {
                log::debug!("search for '{}' cancelled", query);
                Ok(Vec::new())
            }
            Some(result) => result,
        }
    }

    pub(crate) fn report(&self, context: &str, error: &AppError) {
        log::warn!("{}: {}", context, error);
        self.notifier.notify(Notification::error(format!(
            "{}. {}",
            context,
            error.user_message()
        )));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::models::{PaymentRequest, shelves};
    use crate::services::notify::ToastQueue;
    use crate::utils::AbortController;

    /// Scripted in-memory backend that counts listing calls.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub listing_calls: AtomicUsize,
        pub listings: Mutex<Option<Value>>,
        pub categories: Mutex<Option<Value>>,
        pub search: Mutex<Option<Value>>,
        pub delay: Option<Duration>,
    }

    impl FakeApi {
        pub fn with_listings(payload: Value) -> Self {
            Self {
                listings: Mutex::new(Some(payload)),
                ..Self::default()
            }
        }

        fn scripted(slot: &Mutex<Option<Value>>, endpoint: &str) -> Result<Value> {
            slot.lock()
                .unwrap()
                .clone()
                .ok_or_else(|| AppError::status(endpoint, 500, "unscripted"))
        }
    }

    #[async_trait]
    impl StorefrontApi for FakeApi {
        async fn categories(&self) -> Result<Value> {
            Self::scripted(&self.categories, endpoints::CATEGORIES)
        }

        async fn listings(&self, _request: &ListingsRequest) -> Result<Value> {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Self::scripted(&self.listings, endpoints::LISTINGS)
        }

        async fn search(&self, _keyword: &str) -> Result<Value> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Self::scripted(&self.search, endpoints::SEARCH)
        }

        async fn address(&self, _token: &str, _user_id: &str) -> Result<Value> {
            Err(AppError::status(endpoints::ADDRESS, 404, ""))
        }

        async fn create_payment(&self, _token: &str, _request: &PaymentRequest) -> Result<Value> {
            Err(AppError::status(endpoints::CREATE_PAYMENT, 500, ""))
        }

        async fn confirm_payment(&self, _token: &str, _reference: &str) -> Result<Value> {
            Err(AppError::status(endpoints::CONFIRM_PAYMENT, 500, ""))
        }

        async fn user_orders(&self, _token: &str, _user_id: &str) -> Result<Value> {
            Ok(json!([]))
        }

        async fn order(&self, _token: &str, _order_id: &str) -> Result<Value> {
            Err(AppError::status(endpoints::ORDER, 404, ""))
        }
    }

    pub(crate) fn listings_payload(n: usize) -> Value {
        let listings: Vec<Value> = (0..n)
            .map(|i| json!({"_id": format!("b{i}"), "title": format!("Book {i} (10{i})"), "price": "4.99", "stock": 2}))
            .collect();
        json!({"success": true, "listings": listings})
    }

    fn catalog(api: Arc<FakeApi>, toasts: Arc<ToastQueue>) -> Catalog {
        Catalog::new(api, Arc::new(QueryCache::default()), toasts)
    }

    #[tokio::test]
    async fn test_second_identical_request_hits_cache() {
        let api = Arc::new(FakeApi::with_listings(listings_payload(2)));
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), toasts);

        let req = ListingsRequest::shelf(shelves::BEST_SELLERS).with_page(1).with_limit(20);
        let first = catalog.fetch_listings(&req, None).await.unwrap().unwrap();
        let second = catalog.fetch_listings(&req, None).await.unwrap().unwrap();

        assert_eq!(api.listing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(first.listings[0].title, "Book 0");
        assert_eq!(
            catalog.cache().policy().ttl_for(req.shelf.as_deref()),
            Duration::from_secs(30 * 60)
        );
    }

    #[tokio::test]
    async fn test_failure_notifies_and_propagates() {
        let api = Arc::new(FakeApi::with_listings(json!({"success": false})));
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), Arc::clone(&toasts));

        let result = catalog.fetch_listings(&ListingsRequest::default(), None).await;
        assert!(matches!(result, Err(AppError::MalformedResponse { .. })));
        assert_eq!(toasts.drain().len(), 1);
        assert!(catalog.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_is_silent() {
        let api = Arc::new(FakeApi {
            listings: Mutex::new(Some(listings_payload(1))),
            delay: Some(Duration::from_secs(5)),
            ..FakeApi::default()
        });
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), Arc::clone(&toasts));

        let controller = AbortController::new();
        let signal = controller.signal();
        let req = ListingsRequest::default();

        let (result, ()) = tokio::join!(catalog.fetch_listings(&req, Some(&signal)), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.abort();
        });

        assert!(matches!(result, Ok(None)));
        assert!(toasts.is_empty());
        assert!(catalog.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_leader_hands_fetch_to_waiter() {
        let api = Arc::new(FakeApi {
            listings: Mutex::new(Some(listings_payload(1))),
            delay: Some(Duration::from_secs(5)),
            ..FakeApi::default()
        });
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), Arc::clone(&toasts));

        let controller = AbortController::new();
        let signal = controller.signal();
        let req = ListingsRequest::shelf(shelves::NEW_ARRIVALS);

        let (leader, waiter, ()) = tokio::join!(
            catalog.fetch_listings(&req, Some(&signal)),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                catalog.fetch_listings(&req, None).await
            },
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                controller.abort();
            }
        );

        assert!(matches!(leader, Ok(None)));
        assert!(matches!(waiter, Ok(Some(_))));
        assert_eq!(api.listing_calls.load(Ordering::SeqCst), 2);
        assert_eq!(catalog.cache().len(), 1);
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_categories_scenario() {
        let api = Arc::new(FakeApi::default());
        *api.categories.lock().unwrap() = Some(json!({
            "categories": [{"name": "Fiction", "count": 5, "subcategories": [{"name": "Drama", "count": 0}]}]
        }));
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), toasts);

        let categories = catalog.fetch_categories(None).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Fiction");
        assert!(categories[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_categories_or_empty_degrades() {
        let api = Arc::new(FakeApi::default());
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), Arc::clone(&toasts));

        assert!(catalog.fetch_categories(None).await.is_err());
        assert!(catalog.fetch_categories_or_empty(None).await.is_empty());
        assert_eq!(toasts.drain().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_search_skips_network() {
        let api = Arc::new(FakeApi::default());
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), Arc::clone(&toasts));

        assert!(catalog.search("   ", None).await.unwrap().is_empty());
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_shelves_keeps_order() {
        let api = Arc::new(FakeApi::with_listings(listings_payload(1)));
        let toasts = Arc::new(ToastQueue::new());
        let catalog = catalog(Arc::clone(&api), toasts);

        let requests = [
            ListingsRequest::shelf(shelves::BEST_SELLERS),
            ListingsRequest::shelf(shelves::NEW_ARRIVALS),
            ListingsRequest::shelf(shelves::BEST_SELLERS),
        ];
        let results = catalog.fetch_shelves(&requests).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| matches!(r, Ok(Some(_)))));
        assert_eq!(api.listing_calls.load(Ordering::SeqCst), 2);
    }
}

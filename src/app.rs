// src/app.rs

//! Application wiring.
//!
//! [`App`] builds the shared pieces once from [`Config`] and hands out page
//! state bound to them. Every page reads through the same cache.

use std::sync::Arc;

use crate::client::{HttpApi, StorefrontApi};
use crate::error::Result;
use crate::models::{Config, ListingsRequest};
use crate::pages::{InfiniteFeed, ListingFilter, PagedView};
use crate::services::{
    AccountClient, Catalog, Checkout, LogNotifier, Notifier, QueryCache, SearchSession, Session,
    TtlPolicy,
};

pub struct App {
    config: Config,
    catalog: Arc<Catalog>,
    account: Arc<AccountClient>,
    session: Arc<Session>,
}

impl App {
    /// Build against the HTTP backend named in `config`.
    pub fn new(config: Config) -> Result<Self> {
        let api = HttpApi::new(&config.api)?;
        Ok(Self::with_backend(config, Arc::new(api), Arc::new(LogNotifier)))
    }

    /// Build with an explicit backend and notification sink.
    pub fn with_backend(
        config: Config,
        api: Arc<dyn StorefrontApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = Arc::new(QueryCache::new(TtlPolicy::from(&config.cache)));
        let session = Arc::new(Session::new());
        let catalog = Arc::new(Catalog::new(
            Arc::clone(&api),
            cache,
            Arc::clone(&notifier),
        ));
        let account = Arc::new(AccountClient::new(api, Arc::clone(&session), notifier));

        Self {
            config,
            catalog,
            account,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn account(&self) -> &Arc<AccountClient> {
        &self.account
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Page-number view over `base`, using the configured page size.
    pub fn paged_view(&self, base: ListingsRequest, filter: ListingFilter) -> PagedView {
        PagedView::new(
            Arc::clone(&self.catalog),
            base,
            self.config.pagination.page_size,
        )
        .with_filter(filter)
    }

    /// "Load more" feed over `base`, using the configured page size.
    pub fn feed(&self, base: ListingsRequest, filter: ListingFilter) -> InfiniteFeed {
        InfiniteFeed::new(
            Arc::clone(&self.catalog),
            base,
            self.config.pagination.page_size,
        )
        .with_filter(filter)
    }

    pub fn search_session(&self) -> SearchSession {
        SearchSession::new(Arc::clone(&self.catalog), &self.config.search)
    }

    pub fn checkout(&self) -> Checkout {
        Checkout::new(Arc::clone(&self.account))
    }
}

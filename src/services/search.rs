//! Debounced topbar search.
//!
//! Each call to [`SearchSession::input`] represents one keystroke. The
//! request is only sent after the debounce window passes without newer
//! input, and a response is dropped if newer input arrived while it was in
//! flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::Result;
use crate::models::{Listing, SearchConfig};
use crate::services::Catalog;
use crate::services::catalog::SEARCH_FAILED;

/// What became of one keystroke.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// This input is the latest; here are its results
    Results { query: String, listings: Vec<Listing> },
    /// Newer input arrived; nothing to render for this one
    Superseded,
}

/// Search box state shared by every keystroke handler.
pub struct SearchSession {
    catalog: Arc<Catalog>,
    debounce: Duration,
    latest: AtomicU64,
}

impl SearchSession {
    pub fn new(catalog: Arc<Catalog>, config: &SearchConfig) -> Self {
        Self {
            catalog,
            debounce: config.debounce(),
            latest: AtomicU64::new(0),
        }
    }

    /// Sequence number of the most recent input.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.latest() == seq
    }

    /// Handle one input change.
    pub async fn input(&self, query: &str) -> Result<SearchOutcome> {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if !self.is_current(seq) {
            return Ok(SearchOutcome::Superseded);
        }

        let result = self.catalog.search_unreported(query, None).await;
        if !self.is_current(seq) {
            log::debug!("discarding stale search response #{} for '{}'", seq, query);
            return Ok(SearchOutcome::Superseded);
        }

        let listings = result.inspect_err(|e| self.catalog.report(SEARCH_FAILED, e))?;
        Ok(SearchOutcome::Results {
            query: query.trim().to_string(),
            listings,
        })
    }
}

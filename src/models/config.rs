//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Listing cache lifetimes
    #[serde(default)]
    pub cache: CacheConfig,

    /// Topbar search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Listing page sizes
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        url::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.cache.popular_ttl_mins == 0
            || self.cache.standard_ttl_mins == 0
            || self.cache.volatile_ttl_mins == 0
        {
            return Err(AppError::validation("cache TTLs must be > 0"));
        }
        if self.pagination.page_size == 0 {
            return Err(AppError::validation("pagination.page_size must be > 0"));
        }
        Ok(())
    }
}

/// Upstream REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Time-to-live per shelf class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Bestsellers and popular books
    #[serde(default = "defaults::popular_ttl")]
    pub popular_ttl_mins: u64,

    /// Any other named shelf
    #[serde(default = "defaults::standard_ttl")]
    pub standard_ttl_mins: u64,

    /// Recently viewed, or no shelf at all
    #[serde(default = "defaults::volatile_ttl")]
    pub volatile_ttl_mins: u64,
}

fn minutes(mins: u64) -> Duration {
    Duration::from_secs(mins.saturating_mul(60))
}

impl CacheConfig {
    pub fn popular_ttl(&self) -> Duration {
        minutes(self.popular_ttl_mins)
    }

    pub fn standard_ttl(&self) -> Duration {
        minutes(self.standard_ttl_mins)
    }

    pub fn volatile_ttl(&self) -> Duration {
        minutes(self.volatile_ttl_mins)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            popular_ttl_mins: defaults::popular_ttl(),
            standard_ttl_mins: defaults::standard_ttl(),
            volatile_ttl_mins: defaults::volatile_ttl(),
        }
    }
}

/// Debounced search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Idle time after the last keystroke before a request is sent
    #[serde(default = "defaults::debounce")]
    pub debounce_ms: u64,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::debounce(),
        }
    }
}

/// Listing page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "https://api.pagesandpennies.co.uk/api".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; storefront/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Cache defaults
    pub fn popular_ttl() -> u64 {
        30
    }
    pub fn standard_ttl() -> u64 {
        60
    }
    pub fn volatile_ttl() -> u64 {
        5
    }

    // Search defaults
    pub fn debounce() -> u64 {
        300
    }

    // Pagination defaults
    pub fn page_size() -> u32 {
        20
    }
}

//! Transport abstractions for the upstream REST API.
//!
//! Every method returns the raw JSON body. Shape validation and
//! normalization happen in the service layer so that fakes only need to
//! produce JSON.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /categories
//! POST /listings
//! GET  /search?keyword=<q>
//! GET  /users/{id}/address          (bearer)
//! POST /payments/create-payment     (bearer)
//! POST /payments/success/{ref}      (bearer)
//! GET  /orders/user/{id}            (bearer)
//! GET  /orders/{id}                 (bearer)
//! ```

pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{ListingsRequest, PaymentRequest};

// Re-export for convenience
pub use http::HttpApi;

/// Endpoint labels used in errors and logs.
pub mod endpoints {
    pub const CATEGORIES: &str = "/categories";
    pub const LISTINGS: &str = "/listings";
    pub const SEARCH: &str = "/search";
    pub const ADDRESS: &str = "/users/{id}/address";
    pub const CREATE_PAYMENT: &str = "/payments/create-payment";
    pub const CONFIRM_PAYMENT: &str = "/payments/success/{reference}";
    pub const USER_ORDERS: &str = "/orders/user/{id}";
    pub const ORDER: &str = "/orders/{id}";
}

/// Trait for storefront API backends.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn categories(&self) -> Result<Value>;

    async fn listings(&self, request: &ListingsRequest) -> Result<Value>;

    async fn search(&self, keyword: &str) -> Result<Value>;

    async fn address(&self, token: &str, user_id: &str) -> Result<Value>;

    async fn create_payment(&self, token: &str, request: &PaymentRequest) -> Result<Value>;

    async fn confirm_payment(&self, token: &str, reference: &str) -> Result<Value>;

    async fn user_orders(&self, token: &str, user_id: &str) -> Result<Value>;

    async fn order(&self, token: &str, order_id: &str) -> Result<Value>;
}

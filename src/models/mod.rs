// src/models/mod.rs

//! Domain models for the storefront client.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod cart;
mod category;
mod config;
mod listing;
pub mod money;
mod order;

// Re-export all public types
pub use cart::{Cart, CartItem};
pub use category::{CategoryNode, find_by_slug};
pub use config::{ApiConfig, CacheConfig, Config, PaginationConfig, SearchConfig};
pub use listing::{Listing, ListingsMeta, ListingsRequest, ListingsResponse, SortOrder, shelves};
pub use money::Money;
pub use order::{
    Address, Order, OrderLine, OrderStatus, PaymentConfirmation, PaymentLine, PaymentRequest,
    PaymentSession,
};

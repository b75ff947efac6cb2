// src/lib.rs

//! Storefront client library
//!
//! Data layer for a secondhand-book storefront: response normalization, a
//! query cache for listings, the fetch facade every page reads through, and
//! the state behind the listing pages and checkout.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod services;
pub mod utils;

pub use app::App;

//! Service layer for the storefront client.
//!
//! This module contains the business logic for:
//! - Normalizing raw upstream records (`normalize`)
//! - The listings query cache (`QueryCache`)
//! - Catalogue reads (`Catalog`)
//! - Debounced search (`SearchSession`)
//! - Authenticated account calls (`AccountClient`) and checkout (`Checkout`)

pub mod cache;
pub mod catalog;
pub mod image;
pub mod normalize;
pub mod notify;

mod account;
mod checkout;
mod search;

pub use account::{AccountClient, Credentials, Session};
pub use cache::{QueryCache, TtlClass, TtlPolicy, cache_key};
pub use catalog::Catalog;
pub use checkout::{Checkout, CheckoutStep};
pub use notify::{LogNotifier, Notification, Notifier, Severity, ToastQueue};
pub use search::{SearchOutcome, SearchSession};

//! View state for the listing pages.
//!
//! Each page owns its own pagination and filter state and reads through a
//! shared [`Catalog`](crate::services::Catalog).

mod feed;
mod filters;
mod home;
mod paged;

pub use feed::InfiniteFeed;
pub use filters::ListingFilter;
pub use home::{HOME_SHELVES, HomePage, ShelfStrip};
pub use paged::PagedView;

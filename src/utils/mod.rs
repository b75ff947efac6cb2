//! Utility functions and helpers.

pub mod abort;
pub mod http;

pub use abort::{AbortController, AbortSignal, abortable};

//! Client code for the bookcover API.
//!
//! This crate provides the HTTP fetch pipeline, cover extraction from catalog
//! result pages, and the catalog source used by the lookup service.

pub mod catalog;
pub mod extract;
pub mod fetch;

pub use catalog::{CoverSource, Goodreads};
pub use extract::{extract_by_isbn, extract_by_title_author, strip_size_marker};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};

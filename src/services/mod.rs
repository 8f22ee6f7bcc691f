//! Service layer for the tracker.
//!
//! This module contains the network-facing collaborators:
//! - Category listing (`HttpCategorySource`)
//! - Listing page probing (`HttpProber`)

mod categories;
mod probe;

pub use categories::{CategorySource, HttpCategorySource};
pub use probe::{HttpProber, Prober, classify_response};

//! # Listings
//!
//! This crate provides the persistence layer for campground listings and
//! their reviews: domain types, the store traits, and the Postgres
//! implementations.

/// Domain types for listings, images, and reviews.
pub mod types;

/// Store traits for listings and reviews.
pub mod store;

/// Postgres-backed stores.
pub mod pg;

/// In-memory stores used by tests.
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use store::{ListingStore, ReviewStore, StoreError};
pub use types::*;

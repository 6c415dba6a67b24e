//! # Web Handlers for the Trailside Application
//!
//! This crate provides the request handlers: campground listing pages,
//! nested reviews, user registration and login, and the centralized error
//! responder they all funnel into.

/// The page error type and terminal error responder.
mod error;
pub use error::PageError;

/// Server-side view rendering.
pub mod views;

/// Form types and multipart parsing.
pub mod forms;

/// Campground listing pages (index, show, create, edit, update, delete)
mod listing_handlers;
pub use listing_handlers::*;

/// Review handlers nested under a listing
mod review_handlers;
pub use review_handlers::*;

/// Registration, login, and logout handlers
mod auth_handlers;
pub use auth_handlers::*;

/// Route table shared by the server binary and the handler tests.
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

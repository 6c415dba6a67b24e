//! # Auth Services
//!
//! This crate provides user accounts, credential verification, the persisted
//! cookie session store with flash messages, and the session middleware for
//! the Trailside application.

/// User model, forms, and the authentication error type.
pub mod types;

/// User account operations backed by Postgres.
pub mod service;

/// Signed session-id cookie codec.
pub mod cookie;

/// Persisted session store with one-time flash messages.
pub mod session;

/// Session middleware and per-request context extractors.
pub mod middleware;

/// In-memory session store used by tests.
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

//! # Postgres
//!
//! This crate provides the database connection layer for the Trailside
//! application.

/// Connection pool creation and schema migrations.
pub mod database;

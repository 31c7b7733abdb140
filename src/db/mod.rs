//! Database module for PostgreSQL operations.
//!
//! This module provides:
//! - A per-call connection provider (one connection per request, no pool)
//! - Idempotent schema initialization with bounded startup retry
//! - Query functions for the items and logs tables

pub mod conn;
pub mod repo;
pub mod schema;

pub use conn::connect;
pub use schema::SchemaInit;

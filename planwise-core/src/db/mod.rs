//! Database layer for planwise
//!
//! This module provides the event store using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - The [`EventStore`] trait the calendar path persists through

pub mod repo;
pub mod schema;
pub mod store;

pub use repo::Database;
pub use store::EventStore;

//! In-memory driver for mongobridge.
//!
//! This crate provides a thread-safe, in-memory implementation of the `DriverBackend`
//! trait. It interprets the common subset of MongoDB query, update and aggregation
//! syntax and is meant for development, tests and hosts without a database server.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Filters** - Equality, comparison, membership and logical operators over dotted paths
//! - **Updates** - `$set`, `$unset`, `$inc`, pipeline updates and upserts
//! - **Aggregation** - `$match`, `$sort`, `$skip`, `$limit`, `$project` and `$count`
//!
//! # Quick Start
//!
//! ```ignore
//! use mongobridge::{prelude::*, memory::InMemoryDriver};
//! use serde_json::json;
//!
//! let bridge = Bridge::new(ConnectionProvider::with_driver(InMemoryDriver::new(), "fivem"));
//! bridge
//!     .insert(&json!({ "collection": "players", "documents": [{ "name": "Bob" }] }), None)
//!     .await;
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongobridge_memory;

mod evaluator;
pub mod store;

pub use store::{InMemoryDriver, InMemoryDriverBuilder};

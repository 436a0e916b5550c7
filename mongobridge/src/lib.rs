//! MongoDB data access exports for game-server scripting hosts.
//!
//! This crate is the primary entry point of the mongobridge project. It re-exports
//! the façade from `mongobridge-core` and the available drivers.
//!
//! # Features
//!
//! - **Single shared connection** - Connected once from host convars, read by every call
//! - **Callback and return value** - Each call completes once and reports both ways
//! - **Lenient parameters** - Host parameter objects are validated and converted, never trusted
//! - **Multiple drivers** - MongoDB for production, in-memory for development and tests
//!
//! # Quick Start
//!
//! ```ignore
//! use mongobridge::{prelude::*, mongodb::MongoDriver};
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = ConnectionProvider::new();
//!     let events = |name: &str, payload: Value| println!("{name}: {payload}");
//!
//!     // Reads mongodb_url and mongodb_database, connects and raises onDatabaseConnect
//!     provider
//!         .start(&BridgeConfig::from_source(&EnvConvars), MongoDriver::builder, &events)
//!         .await
//!         .ok();
//!
//!     let bridge = Bridge::new(provider);
//!
//!     let ids = bridge
//!         .insert(
//!             &json!({ "collection": "players", "documents": [{ "name": "Bob" }] }),
//!             Some(Box::new(|args| println!("inserted {args:?}"))),
//!         )
//!         .await;
//!
//!     let found = bridge
//!         .call("findOne", &json!({ "collection": "players", "query": { "name": "Bob" } }), None)
//!         .await;
//! }
//! ```
//!
//! # Drivers
//!
//! - [`memory`] - In-memory driver for development and testing
//! - [`mongodb`] - MongoDB driver (requires `mongodb` feature)

pub mod prelude;

pub use mongobridge_core::{
    backend, bridge, config, error, events, export, exports, params, provider,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory driver implementations.
pub mod memory {
    pub use mongobridge_memory::{InMemoryDriver, InMemoryDriverBuilder};
}

/// MongoDB driver implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use mongobridge_mongodb::{MongoDriver, MongoDriverBuilder};
}

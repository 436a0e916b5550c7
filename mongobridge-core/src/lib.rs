//! Data access exports for game-server scripting hosts.
//!
//! This crate is the core of the mongobridge project and provides:
//!
//! - **Configuration** ([`config`]) - Endpoint URL and database name read from host convars
//! - **Host events** ([`events`]) - The "database connected" notification
//! - **Driver abstraction** ([`backend`]) - The primitives a document database driver provides
//! - **Connection provider** ([`provider`]) - The single, write-once shared connection
//! - **Parameter validation** ([`params`]) - Checking and converting host parameter objects
//! - **Export transform** ([`export`]) - Rendering driver results as host values
//! - **Dispatchers** ([`bridge`]) - One entry point per database operation
//! - **Export table** ([`exports`]) - Routing host calls by export name
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use mongobridge_core::{
//!     bridge::Bridge,
//!     config::{BridgeConfig, EnvConvars},
//!     provider::ConnectionProvider,
//! };
//! use serde_json::json;
//!
//! let provider = ConnectionProvider::new();
//! provider
//!     .start(&BridgeConfig::from_source(&EnvConvars), MongoDriver::builder, &events)
//!     .await?;
//!
//! let bridge = Bridge::new(provider);
//! let players = bridge
//!     .find(&json!({ "collection": "players", "query": { "job": "police" } }), None)
//!     .await;
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongobridge_core;

pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod exports;
pub mod params;
pub mod provider;

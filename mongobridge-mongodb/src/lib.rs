//! MongoDB driver for mongobridge.
//!
//! This crate provides a MongoDB-based implementation of the `DriverBackend` trait.
//! Query, update and pipeline documents are forwarded to the server untouched, so
//! scripts get the full MongoDB query language.
//!
//! To use this driver, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mongobridge = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Connection check** - The builder pings the server before handing out a driver
//! - **Typed options** - Host option objects are mapped onto the driver's option structs
//! - **Pooling** - One client, shared by every concurrent host call
//!
//! # Example
//!
//! ```ignore
//! use mongobridge::{backend::DriverBuilder, mongodb::MongoDriver};
//!
//! let driver = MongoDriver::builder("mongodb://localhost:27017", "fivem")
//!     .build()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongobridge_mongodb;

pub mod driver;
mod options;

pub use driver::{MongoDriver, MongoDriverBuilder};

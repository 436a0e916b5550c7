//! Convenient re-exports of commonly used types from mongobridge.
//!
//! ```ignore
//! use mongobridge::prelude::*;
//! ```

pub use mongobridge_core::{
    backend::{
        BulkWriteSummary, Cardinality, DriverBackend, DriverBuilder, UpdateSpec, WriteOperation,
    },
    bridge::{Bridge, Callback, Completion},
    config::{BridgeConfig, BridgeSettings, ConvarSource, EnvConvars},
    error::{BridgeError, BridgeResult},
    events::{DATABASE_CONNECTED, HostEvents, NoopEvents},
    exports::Export,
    provider::ConnectionProvider,
};

//! Error types and result types for bridge operations.
//!
//! Dispatchers never hand these to the host: they are logged and turned into the
//! `false` failure sentinel. Rust embedders see them from startup and from the
//! driver trait.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur while serving a host call.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A required configuration value is missing.
    /// The argument is the name of the convar that is not set.
    #[error("Convar \"{0}\" not set")]
    Configuration(String),
    /// Opening the connection to the database failed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A connection handle is already stored; the handle is write-once.
    #[error("Database is already connected")]
    AlreadyConnected,
    /// An operation was invoked before a connection was established.
    #[error("Database is not connected.")]
    NotReady,
    /// The params argument is not a structured object.
    #[error("Invalid params object.")]
    InvalidParams,
    /// The `collection` field is missing or names no valid collection.
    #[error("Invalid collection \"{0}\"")]
    InvalidCollection(String),
    /// An operation specific field is missing or has the wrong shape.
    #[error("Invalid 'params.{field}' value. Expected {expected}.")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    /// A value could not be converted between host and BSON representations.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The underlying driver call failed.
    #[error("{0}")]
    Driver(String),
}

impl BridgeError {
    pub(crate) fn invalid_field(field: &'static str, expected: &'static str) -> Self {
        BridgeError::InvalidField { field, expected }
    }
}

/// A specialized `Result` type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl From<BsonError> for BridgeError {
    fn from(err: BsonError) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for BridgeError {
    fn from(err: SerdeJsonError) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

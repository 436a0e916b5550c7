//! The single shared connection behind every export.
//!
//! A [`ConnectionProvider`] holds at most one driver handle. The handle is written
//! once, on the first successful connect, and is never replaced or closed, so
//! dispatchers read it without locking.

use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    backend::{DriverBackend, DriverBuilder},
    config::BridgeConfig,
    error::{BridgeError, BridgeResult},
    events::{DATABASE_CONNECTED, HostEvents},
};

#[derive(Debug)]
struct Connection {
    driver: Arc<dyn DriverBackend>,
    database: String,
}

/// Owner of the write-once connection handle.
#[derive(Debug, Default)]
pub struct ConnectionProvider {
    connection: OnceLock<Connection>,
}

impl ConnectionProvider {
    /// Creates a provider without a connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that already holds `driver`.
    ///
    /// No event is raised. Useful to embed the façade over a driver built elsewhere.
    pub fn with_driver(driver: impl DriverBackend + 'static, database: &str) -> Self {
        let provider = Self::new();
        let _ = provider.connection.set(Connection {
            driver: Arc::new(driver),
            database: database.to_string(),
        });
        provider
    }

    /// Returns `true` iff a connection handle is stored.
    pub fn is_ready(&self) -> bool {
        self.connection.get().is_some()
    }

    /// The connected driver, if any.
    pub fn driver(&self) -> Option<Arc<dyn DriverBackend>> {
        self.connection
            .get()
            .map(|conn| conn.driver.clone())
    }

    /// Name of the connected database, if any.
    pub fn database(&self) -> Option<&str> {
        self.connection
            .get()
            .map(|conn| conn.database.as_str())
    }

    /// Connects using both configuration values.
    ///
    /// Missing values are logged one by one and no connection is attempted.
    /// `make_builder` receives the endpoint URL and the database name.
    pub async fn start<F, B>(
        &self,
        config: &BridgeConfig,
        make_builder: F,
        events: &dyn HostEvents,
    ) -> BridgeResult<()>
    where
        F: FnOnce(&str, &str) -> B,
        B: DriverBuilder,
    {
        let (url, database) = config.require()?;

        self.connect(make_builder(url, database), database, events)
            .await
    }

    /// Builds the driver and stores it as the shared handle.
    ///
    /// On success the [`DATABASE_CONNECTED`] event is raised with the database name.
    /// A failed attempt is logged and leaves the provider empty; there is no retry.
    pub async fn connect<B>(
        &self,
        builder: B,
        database: &str,
        events: &dyn HostEvents,
    ) -> BridgeResult<()>
    where
        B: DriverBuilder,
    {
        if self.is_ready() {
            warn!(database, "Ignoring connect request, database is already connected");
            return Err(BridgeError::AlreadyConnected);
        }

        let driver = match builder.build().await {
            Ok(driver) => driver,
            Err(err) => {
                error!(database, "Error: {err}");
                return Err(err);
            }
        };

        let stored = self.connection.set(Connection {
            driver: Arc::new(driver),
            database: database.to_string(),
        });
        if stored.is_err() {
            warn!(database, "Another connect completed first, discarding this connection");
            return Err(BridgeError::AlreadyConnected);
        }

        info!(database, "Connected to database \"{database}\".");
        events.emit(DATABASE_CONNECTED, Value::String(database.to_string()));

        Ok(())
    }
}

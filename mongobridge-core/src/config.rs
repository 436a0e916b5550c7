//! Startup configuration read from host convars.

use std::collections::HashMap;

use tracing::error;

use crate::error::{BridgeError, BridgeResult};

/// Convar holding the database endpoint URL.
pub const URL_CONVAR: &str = "mongodb_url";
/// Convar holding the database name.
pub const DATABASE_CONVAR: &str = "mongodb_database";
/// Value a convar reports when the server operator never set it.
pub const UNSET: &str = "changeme";

/// A source of named configuration values, as exposed by the host runtime.
pub trait ConvarSource {
    /// Returns the value of `name`, or `default` when the host has no value for it.
    fn convar(&self, name: &str, default: &str) -> String;
}

/// Reads convars from the process environment.
///
/// The exact name is tried first, then its upper-case form (`MONGODB_URL`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConvars;

impl ConvarSource for EnvConvars {
    fn convar(&self, name: &str, default: &str) -> String {
        std::env::var(name)
            .or_else(|_| std::env::var(name.to_uppercase()))
            .unwrap_or_else(|_| default.to_string())
    }
}

impl ConvarSource for HashMap<String, String> {
    fn convar(&self, name: &str, default: &str) -> String {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Connection settings: the endpoint URL and the database name.
///
/// Both are required. `None` means the convar was left at [`UNSET`] or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    pub url: Option<String>,
    pub database: Option<String>,
}

impl BridgeConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: Self::normalize(url.into()),
            database: Self::normalize(database.into()),
        }
    }

    /// Reads both convars from `source`.
    pub fn from_source(source: &impl ConvarSource) -> Self {
        Self::new(
            source.convar(URL_CONVAR, UNSET),
            source.convar(DATABASE_CONVAR, UNSET),
        )
    }

    /// Returns `(url, database)` when both are set.
    ///
    /// Each missing value is logged separately; the returned error names the first one.
    pub fn require(&self) -> BridgeResult<(&str, &str)> {
        if self.url.is_none() {
            error!("Convar \"{URL_CONVAR}\" not set");
        }
        if self.database.is_none() {
            error!("Convar \"{DATABASE_CONVAR}\" not set");
        }

        match (self.url.as_deref(), self.database.as_deref()) {
            (Some(url), Some(database)) => Ok((url, database)),
            (None, _) => Err(BridgeError::Configuration(URL_CONVAR.to_string())),
            (_, None) => Err(BridgeError::Configuration(DATABASE_CONVAR.to_string())),
        }
    }

    fn normalize(value: String) -> Option<String> {
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed == UNSET {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Dispatcher behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeSettings {
    /// Invoke callbacks with `false, message` when the driver call fails.
    ///
    /// Off by default: historically callers only ever saw successful completions.
    ///
    /// When on, the callback and the return value disagree on failure: the callback's
    /// second argument is the error message while the call still returns `false`.
    /// Callers relying on `insertOne` returning the same id its callback receives
    /// should leave this off.
    pub report_errors: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_convars_are_unset() {
        let config = BridgeConfig::from_source(&convars(&[]));
        assert_eq!(config, BridgeConfig::default());
        assert!(matches!(
            config.require(),
            Err(BridgeError::Configuration(name)) if name == URL_CONVAR
        ));
    }

    #[test]
    fn test_sentinel_value_counts_as_unset() {
        let config = BridgeConfig::from_source(&convars(&[
            (URL_CONVAR, "mongodb://localhost:27017"),
            (DATABASE_CONVAR, UNSET),
        ]));
        assert_eq!(config.url.as_deref(), Some("mongodb://localhost:27017"));
        assert!(config.database.is_none());
        assert!(matches!(
            config.require(),
            Err(BridgeError::Configuration(name)) if name == DATABASE_CONVAR
        ));
    }

    #[test]
    fn test_complete_config() {
        let config = BridgeConfig::from_source(&convars(&[
            (URL_CONVAR, " mongodb://db:27017 "),
            (DATABASE_CONVAR, "fivem"),
        ]));
        let (url, database) = config.require().unwrap();
        assert_eq!(url, "mongodb://db:27017");
        assert_eq!(database, "fivem");
    }
}

//! Notifications raised towards the host runtime.

use serde_json::Value;

/// Event raised once the shared connection is established. Payload: the database name.
pub const DATABASE_CONNECTED: &str = "onDatabaseConnect";

/// Delivers named events to the host runtime.
pub trait HostEvents: Send + Sync {
    fn emit(&self, name: &str, payload: Value);
}

impl<F> HostEvents for F
where
    F: Fn(&str, Value) + Send + Sync,
{
    fn emit(&self, name: &str, payload: Value) {
        self(name, payload)
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl HostEvents for NoopEvents {
    fn emit(&self, _name: &str, _payload: Value) {}
}

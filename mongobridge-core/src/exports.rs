//! The call surface as seen by the host runtime: one export per name.

use std::{fmt, str::FromStr};

use serde_json::Value;
use tracing::error;

use crate::bridge::{Bridge, Callback};

/// Every function name registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Export {
    IsConnected,
    Insert,
    InsertOne,
    Find,
    FindOne,
    Update,
    UpdateOne,
    Count,
    Delete,
    DeleteOne,
    Aggregate,
    BulkWrite,
}

impl Export {
    pub const ALL: [Export; 12] = [
        Export::IsConnected,
        Export::Insert,
        Export::InsertOne,
        Export::Find,
        Export::FindOne,
        Export::Update,
        Export::UpdateOne,
        Export::Count,
        Export::Delete,
        Export::DeleteOne,
        Export::Aggregate,
        Export::BulkWrite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Export::IsConnected => "isConnected",
            Export::Insert => "insert",
            Export::InsertOne => "insertOne",
            Export::Find => "find",
            Export::FindOne => "findOne",
            Export::Update => "update",
            Export::UpdateOne => "updateOne",
            Export::Count => "count",
            Export::Delete => "delete",
            Export::DeleteOne => "deleteOne",
            Export::Aggregate => "aggregate",
            Export::BulkWrite => "bulkWrite",
        }
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExport(pub String);

impl fmt::Display for UnknownExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown export \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownExport {}

impl FromStr for Export {
    type Err = UnknownExport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Export::ALL
            .into_iter()
            .find(|export| export.name() == s)
            .ok_or_else(|| UnknownExport(s.to_string()))
    }
}

impl Bridge {
    /// Routes a host invocation by export name.
    ///
    /// `aggregate` and `bulkWrite` ignore `callback`. Unknown names are logged and
    /// yield `false`.
    pub async fn call(&self, name: &str, params: &Value, callback: Option<Callback>) -> Value {
        let export = match name.parse::<Export>() {
            Ok(export) => export,
            Err(err) => {
                error!("{err}");
                return Value::Bool(false);
            }
        };

        match export {
            Export::IsConnected => Value::Bool(self.is_connected()),
            Export::Insert => self.insert(params, callback).await,
            Export::InsertOne => self.insert_one(params, callback).await,
            Export::Find => self.find(params, callback).await,
            Export::FindOne => self.find_one(params, callback).await,
            Export::Update => self.update(params, callback).await,
            Export::UpdateOne => self.update_one(params, callback).await,
            Export::Count => self.count(params, callback).await,
            Export::Delete => self.delete(params, callback).await,
            Export::DeleteOne => self.delete_one(params, callback).await,
            Export::Aggregate => self.aggregate(params).await,
            Export::BulkWrite => self.bulk_write(params).await,
        }
    }
}

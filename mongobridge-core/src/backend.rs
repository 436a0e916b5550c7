//! Driver abstraction for the data access façade.
//!
//! This module defines the traits that separate the façade from the document
//! database client it forwards to, so the same dispatchers run over MongoDB or an
//! in-memory store.
//!
//! # Traits
//!
//! - [`DriverBackend`]: The operation primitives a driver provides
//! - [`DriverBuilder`]: Factory trait for connecting a driver
//!
//! Query, update and pipeline documents are handed over as-is. A driver is
//! responsible for interpreting them; the façade only checks that they are
//! structured values.

use std::{collections::HashMap, fmt::Debug};

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use serde::Serialize;

use crate::{
    error::{BridgeError, BridgeResult},
    export::id_to_string,
};

/// Selects whether a conditional write applies to the first match or to every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Many,
}

/// The modification applied by an update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateSpec {
    /// An update document made of operators such as `$set`.
    Document(Document),
    /// An aggregation pipeline update.
    Pipeline(Vec<Document>),
}

/// Result of a multi-document insert.
///
/// `inserted_ids` is keyed by the position of the document in the input. Drivers
/// are free to report it sparsely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertManyOutcome {
    pub inserted_count: u64,
    pub inserted_ids: HashMap<usize, Bson>,
}

/// Result of an update or replace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Bson>,
}

/// A single descriptor of a mixed write batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    InsertOne {
        document: Document,
    },
    Update {
        filter: Document,
        update: UpdateSpec,
        upsert: bool,
        cardinality: Cardinality,
    },
    ReplaceOne {
        filter: Document,
        replacement: Document,
        upsert: bool,
    },
    Delete {
        filter: Document,
        cardinality: Cardinality,
    },
}

/// Totals reported by a mixed write batch.
///
/// Serialized with the field names scripts already read (`insertedCount`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkWriteSummary {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub deleted_count: u64,
    pub upserted_count: u64,
    pub inserted_ids: HashMap<usize, String>,
    pub upserted_ids: HashMap<usize, String>,
}

/// Abstract interface for document database drivers.
///
/// Implementations must be thread-safe: the façade shares one driver across every
/// concurrent host call and never serializes access to it. Pooling and request
/// multiplexing are the driver's concern.
///
/// # Arguments
///
/// Every method receives the collection name first. Names reaching a driver have
/// already been validated by the façade. `options` documents are passed through
/// from the host; drivers pick the keys they understand and ignore the rest.
#[async_trait]
pub trait DriverBackend: Send + Sync + Debug {
    /// Inserts `documents` in order.
    ///
    /// Documents without an `_id` receive a generated one, which is reported in
    /// [`InsertManyOutcome::inserted_ids`] under the document's input position.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: Document,
    ) -> BridgeResult<InsertManyOutcome>;

    /// Inserts a single document and returns its `_id`.
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: Document,
    ) -> BridgeResult<Bson>;

    /// Returns the documents matching `filter`, in driver order.
    ///
    /// `limit`, when present, caps the number of documents returned and takes
    /// precedence over any limit found in `options`.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        limit: Option<i64>,
    ) -> BridgeResult<Vec<Document>>;

    /// Returns the first document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> BridgeResult<Option<Document>>;

    /// Applies `update` to the first (`Single`) or every (`Many`) match of `filter`.
    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: UpdateSpec,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<UpdateOutcome>;

    /// Replaces the first match of `filter` with `replacement`.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Document,
    ) -> BridgeResult<UpdateOutcome>;

    /// Deletes the first (`Single`) or every (`Many`) match of `filter`.
    ///
    /// Returns the deleted count.
    async fn delete(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<u64>;

    /// Counts the documents matching `filter`.
    async fn count(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> BridgeResult<u64>;

    /// Runs an aggregation pipeline and materializes every result document.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
        options: Document,
    ) -> BridgeResult<Vec<Document>>;

    /// Executes a mixed batch of writes against one collection.
    ///
    /// The default implementation runs the operations one after another through the
    /// single-operation primitives. When `ordered` is set the batch stops at the first
    /// failure; otherwise every operation is attempted and the batch fails if any did.
    async fn bulk_write(
        &self,
        collection: &str,
        operations: Vec<WriteOperation>,
        ordered: bool,
    ) -> BridgeResult<BulkWriteSummary> {
        let mut summary = BulkWriteSummary::default();
        let mut failures = Vec::new();

        for (index, operation) in operations.into_iter().enumerate() {
            let result = apply_write(self, collection, index, operation, &mut summary).await;

            if let Err(err) = result {
                if ordered {
                    return Err(BridgeError::Driver(format!("operation {index}: {err}")));
                }
                failures.push(format!("operation {index}: {err}"));
            }
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(BridgeError::Driver(failures.join("; ")))
        }
    }
}

async fn apply_write<D>(
    driver: &D,
    collection: &str,
    index: usize,
    operation: WriteOperation,
    summary: &mut BulkWriteSummary,
) -> BridgeResult<()>
where
    D: DriverBackend + ?Sized,
{
    match operation {
        WriteOperation::InsertOne { document } => {
            let id = driver.insert_one(collection, document, Document::new()).await?;
            summary.inserted_count += 1;
            summary.inserted_ids.insert(index, id_to_string(&id));
        }
        WriteOperation::Update { filter, update, upsert, cardinality } => {
            let outcome = driver
                .update(collection, filter, update, doc! { "upsert": upsert }, cardinality)
                .await?;
            summary.record_update(index, outcome);
        }
        WriteOperation::ReplaceOne { filter, replacement, upsert } => {
            let outcome = driver
                .replace_one(collection, filter, replacement, doc! { "upsert": upsert })
                .await?;
            summary.record_update(index, outcome);
        }
        WriteOperation::Delete { filter, cardinality } => {
            summary.deleted_count += driver
                .delete(collection, filter, Document::new(), cardinality)
                .await?;
        }
    }

    Ok(())
}

impl BulkWriteSummary {
    fn record_update(&mut self, index: usize, outcome: UpdateOutcome) {
        self.matched_count += outcome.matched_count;
        self.modified_count += outcome.modified_count;

        if let Some(id) = outcome.upserted_id {
            self.upserted_count += 1;
            self.upserted_ids.insert(index, id_to_string(&id));
        }
    }
}

/// Factory for drivers, consumed once by the connection provider.
#[async_trait]
pub trait DriverBuilder {
    type Driver: DriverBackend + 'static;

    /// Connects the driver. Failing here leaves the provider without a handle.
    async fn build(self) -> BridgeResult<Self::Driver>;
}

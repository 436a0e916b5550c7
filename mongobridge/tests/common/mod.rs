#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use mongobridge::{
    backend::{InsertManyOutcome, UpdateOutcome},
    bson::{Bson, Document},
    prelude::*,
};
use serde_json::Value;

/// One driver primitive invocation, as seen by [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub collection: String,
    pub args: Vec<Document>,
    pub options: Document,
    pub limit: Option<i64>,
    pub cardinality: Option<Cardinality>,
}

impl Call {
    fn new(op: &'static str, collection: &str, args: Vec<Document>, options: Document) -> Self {
        Self {
            op,
            collection: collection.to_string(),
            args,
            options,
            limit: None,
            cardinality: None,
        }
    }
}

/// Records every call and answers from canned data.
///
/// `update` and `delete` report one affected document for `Single` and
/// `matches` documents for `Many`.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub documents: Vec<Document>,
    pub inserted_ids: Option<HashMap<usize, Bson>>,
    pub matches: u64,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            matches: 3,
            ..Default::default()
        }
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_inserted_ids(mut self, ids: HashMap<usize, Bson>) -> Self {
        self.inserted_ids = Some(ids);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn affected(&self, cardinality: Cardinality) -> u64 {
        match cardinality {
            Cardinality::Single => self.matches.min(1),
            Cardinality::Many => self.matches,
        }
    }
}

#[async_trait]
impl DriverBackend for RecordingDriver {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: Document,
    ) -> BridgeResult<InsertManyOutcome> {
        let count = documents.len();
        self.record(Call::new("insert_many", collection, documents, options));

        let inserted_ids = self.inserted_ids.clone().unwrap_or_else(|| {
            (0..count)
                .map(|index| (index, Bson::String(format!("id-{index}"))))
                .collect()
        });

        Ok(InsertManyOutcome {
            inserted_count: inserted_ids.len() as u64,
            inserted_ids,
        })
    }

    async fn insert_one(&self, collection: &str, document: Document, options: Document) -> BridgeResult<Bson> {
        self.record(Call::new("insert_one", collection, vec![document], options));
        Ok(Bson::String("id-0".to_string()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        limit: Option<i64>,
    ) -> BridgeResult<Vec<Document>> {
        let mut call = Call::new("find", collection, vec![filter], options);
        call.limit = limit;
        self.record(call);

        let cap = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(self.documents.iter().take(cap).cloned().collect())
    }

    async fn find_one(&self, collection: &str, filter: Document, options: Document) -> BridgeResult<Option<Document>> {
        self.record(Call::new("find_one", collection, vec![filter], options));
        Ok(self.documents.first().cloned())
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: UpdateSpec,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<UpdateOutcome> {
        let mut args = vec![filter];
        match update {
            UpdateSpec::Document(update) => args.push(update),
            UpdateSpec::Pipeline(stages) => args.extend(stages),
        }
        let mut call = Call::new("update", collection, args, options);
        call.cardinality = Some(cardinality);
        self.record(call);

        let affected = self.affected(cardinality);
        Ok(UpdateOutcome {
            matched_count: affected,
            modified_count: affected,
            upserted_id: None,
        })
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Document,
    ) -> BridgeResult<UpdateOutcome> {
        self.record(Call::new("replace_one", collection, vec![filter, replacement], options));
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
            upserted_id: None,
        })
    }

    async fn delete(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<u64> {
        let mut call = Call::new("delete", collection, vec![filter], options);
        call.cardinality = Some(cardinality);
        self.record(call);

        Ok(self.affected(cardinality))
    }

    async fn count(&self, collection: &str, filter: Document, options: Document) -> BridgeResult<u64> {
        self.record(Call::new("count", collection, vec![filter], options));
        Ok(self.documents.len() as u64)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
        options: Document,
    ) -> BridgeResult<Vec<Document>> {
        self.record(Call::new("aggregate", collection, pipeline, options));
        Ok(self.documents.clone())
    }
}

/// Fails every call with the same driver error.
#[derive(Debug, Clone, Default)]
pub struct FailingDriver;

fn boom<T>() -> BridgeResult<T> {
    Err(BridgeError::Driver("boom".to_string()))
}

#[async_trait]
impl DriverBackend for FailingDriver {
    async fn insert_many(&self, _: &str, _: Vec<Document>, _: Document) -> BridgeResult<InsertManyOutcome> {
        boom()
    }

    async fn insert_one(&self, _: &str, _: Document, _: Document) -> BridgeResult<Bson> {
        boom()
    }

    async fn find(&self, _: &str, _: Document, _: Document, _: Option<i64>) -> BridgeResult<Vec<Document>> {
        boom()
    }

    async fn find_one(&self, _: &str, _: Document, _: Document) -> BridgeResult<Option<Document>> {
        boom()
    }

    async fn update(
        &self,
        _: &str,
        _: Document,
        _: UpdateSpec,
        _: Document,
        _: Cardinality,
    ) -> BridgeResult<UpdateOutcome> {
        boom()
    }

    async fn replace_one(&self, _: &str, _: Document, _: Document, _: Document) -> BridgeResult<UpdateOutcome> {
        boom()
    }

    async fn delete(&self, _: &str, _: Document, _: Document, _: Cardinality) -> BridgeResult<u64> {
        boom()
    }

    async fn count(&self, _: &str, _: Document, _: Document) -> BridgeResult<u64> {
        boom()
    }

    async fn aggregate(&self, _: &str, _: Vec<Document>, _: Document) -> BridgeResult<Vec<Document>> {
        boom()
    }
}

/// A callback that stores every invocation.
pub fn capture() -> (Callback, Arc<Mutex<Vec<Vec<Value>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    (
        Box::new(move |args| sink.lock().unwrap().push(args)),
        seen,
    )
}

pub fn bridge_over(driver: impl DriverBackend + 'static) -> Bridge {
    Bridge::new(ConnectionProvider::with_driver(driver, "fivem"))
}

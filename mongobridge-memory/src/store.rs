//! In-memory driver implementation.
//!
//! Documents are kept per collection in insertion order behind an async-aware
//! read-write lock.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use mea::rwlock::RwLock;
use tracing::debug;

use mongobridge_core::{
    backend::{
        Cardinality, DriverBackend, DriverBuilder, InsertManyOutcome, UpdateOutcome, UpdateSpec,
    },
    error::{BridgeError, BridgeResult},
};

use crate::evaluator::{
    DocumentEvaluator, apply_update, as_i64, check_update, project, run_pipeline, seed_from_filter,
    sort_documents,
};

type CollectionDocs = Vec<Document>;
type StoreMap = HashMap<String, CollectionDocs>;

/// Thread-safe in-memory document driver.
///
/// `InMemoryDriver` is cloneable and uses an `Arc`-wrapped internal state; clones
/// share the same data. Queries scan every document of the collection.
///
/// # Example
///
/// ```ignore
/// use mongobridge_memory::InMemoryDriver;
/// use mongobridge_core::backend::DriverBackend;
/// use bson::doc;
///
/// let driver = InMemoryDriver::new();
/// let id = driver.insert_one("players", doc! { "name": "Bob" }, doc! {}).await?;
/// let found = driver.find_one("players", doc! { "_id": id }, doc! {}).await?;
/// assert!(found.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryDriver {
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryDriver {
    /// Creates an empty driver.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder, optionally seeded with documents.
    pub fn builder() -> InMemoryDriverBuilder {
        InMemoryDriverBuilder::default()
    }

    /// Snapshot of a collection, in storage order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.store
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn select(
        documents: &CollectionDocs,
        filter: &Document,
        options: &Document,
        limit: Option<i64>,
    ) -> BridgeResult<Vec<Document>> {
        let mut matched = DocumentEvaluator::filter_documents(documents.iter(), filter)?;

        if let Ok(sort) = options.get_document("sort") {
            sort_documents(&mut matched, sort);
        }

        let skip = options.get("skip").and_then(as_i64).unwrap_or(0).max(0) as usize;
        let limit = limit
            .or_else(|| options.get("limit").and_then(as_i64))
            .filter(|limit| *limit > 0)
            .map(|limit| limit as usize)
            .unwrap_or(usize::MAX);

        let projected = match options.get_document("projection") {
            Ok(projection) => matched
                .into_iter()
                .skip(skip)
                .take(limit)
                .map(|doc| project(doc, projection))
                .collect(),
            Err(_) => matched
                .into_iter()
                .skip(skip)
                .take(limit)
                .collect(),
        };

        Ok(projected)
    }
}

/// Places a generated `ObjectId` first when the document carries no `_id`.
fn ensure_id(document: Document) -> (Bson, Document) {
    if let Some(id) = document.get("_id") {
        return (id.clone(), document);
    }

    let id = Bson::ObjectId(ObjectId::new());
    let mut with_id = doc! { "_id": id.clone() };
    for (key, value) in document {
        with_id.insert(key, value);
    }

    (id, with_id)
}

fn insert_into(
    documents: &mut CollectionDocs,
    collection: &str,
    document: Document,
) -> BridgeResult<Bson> {
    let (id, document) = ensure_id(document);

    if documents.iter().any(|existing| existing.get("_id") == Some(&id)) {
        return Err(BridgeError::Driver(format!(
            "E11000 duplicate key error collection: {collection} index: _id_ dup key: {{ _id: {id} }}"
        )));
    }

    documents.push(document);
    Ok(id)
}

fn check_replacement(replacement: &Document) -> BridgeResult<()> {
    if replacement.keys().any(|key| key.starts_with('$')) {
        return Err(BridgeError::Driver(
            "Replacement document must not contain atomic operators".to_string(),
        ));
    }
    Ok(())
}

fn check_id_unchanged(before: &Document, after: &Document) -> BridgeResult<()> {
    match (before.get("_id"), after.get("_id")) {
        (Some(old), Some(new)) if old != new => Err(BridgeError::Driver(
            "Performing an update on the path '_id' would modify the immutable field '_id'".to_string(),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl DriverBackend for InMemoryDriver {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: Document,
    ) -> BridgeResult<InsertManyOutcome> {
        let ordered = options.get_bool("ordered").unwrap_or(true);
        let mut store = self.store.write().await;
        let stored = store.entry(collection.to_string()).or_default();

        let mut outcome = InsertManyOutcome::default();
        let mut failures = Vec::new();

        for (index, document) in documents.into_iter().enumerate() {
            match insert_into(stored, collection, document) {
                Ok(id) => {
                    outcome.inserted_count += 1;
                    outcome.inserted_ids.insert(index, id);
                }
                Err(err) if ordered => return Err(err),
                Err(err) => failures.push(err.to_string()),
            }
        }

        if !failures.is_empty() {
            return Err(BridgeError::Driver(failures.join("; ")));
        }

        debug!(collection, inserted = outcome.inserted_count, "inserted documents");
        Ok(outcome)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        _options: Document,
    ) -> BridgeResult<Bson> {
        let mut store = self.store.write().await;
        let stored = store.entry(collection.to_string()).or_default();

        insert_into(stored, collection, document)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        limit: Option<i64>,
    ) -> BridgeResult<Vec<Document>> {
        let store = self.store.read().await;

        match store.get(collection) {
            Some(documents) => Self::select(documents, &filter, &options, limit),
            None => Ok(vec![]),
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> BridgeResult<Option<Document>> {
        Ok(self
            .find(collection, filter, options, Some(1))
            .await?
            .into_iter()
            .next())
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: UpdateSpec,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<UpdateOutcome> {
        check_update(&update)?;

        let upsert = options.get_bool("upsert").unwrap_or(false);
        let mut store = self.store.write().await;
        let stored = store.entry(collection.to_string()).or_default();
        let mut outcome = UpdateOutcome::default();

        for document in stored.iter_mut() {
            if !DocumentEvaluator::new(document).matches(&filter)? {
                continue;
            }

            outcome.matched_count += 1;

            let mut next = document.clone();
            if apply_update(&mut next, &update)? {
                check_id_unchanged(document, &next)?;
                *document = next;
                outcome.modified_count += 1;
            }

            if cardinality == Cardinality::Single {
                break;
            }
        }

        if outcome.matched_count == 0 && upsert {
            let mut seed = seed_from_filter(&filter);
            apply_update(&mut seed, &update)?;
            outcome.upserted_id = Some(insert_into(stored, collection, seed)?);
        }

        Ok(outcome)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Document,
    ) -> BridgeResult<UpdateOutcome> {
        check_replacement(&replacement)?;

        let upsert = options.get_bool("upsert").unwrap_or(false);
        let mut store = self.store.write().await;
        let stored = store.entry(collection.to_string()).or_default();
        let mut outcome = UpdateOutcome::default();

        let mut position = None;
        for (index, document) in stored.iter().enumerate() {
            if DocumentEvaluator::new(document).matches(&filter)? {
                position = Some(index);
                break;
            }
        }

        match position {
            Some(index) => {
                let current = &stored[index];
                let mut next = match current.get("_id") {
                    Some(id) => doc! { "_id": id.clone() },
                    None => Document::new(),
                };
                for (key, value) in replacement {
                    next.insert(key, value);
                }
                check_id_unchanged(current, &next)?;

                outcome.matched_count = 1;
                if *current != next {
                    outcome.modified_count = 1;
                    stored[index] = next;
                }
            }
            None if upsert => {
                let mut seed = match seed_from_filter(&filter).get("_id") {
                    Some(id) => doc! { "_id": id.clone() },
                    None => Document::new(),
                };
                for (key, value) in replacement {
                    seed.insert(key, value);
                }
                outcome.upserted_id = Some(insert_into(stored, collection, seed)?);
            }
            None => {}
        }

        Ok(outcome)
    }

    async fn delete(
        &self,
        collection: &str,
        filter: Document,
        _options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<u64> {
        let mut store = self.store.write().await;
        let Some(stored) = store.get_mut(collection) else {
            return Ok(0);
        };

        let mut matched = Vec::new();
        for (index, document) in stored.iter().enumerate() {
            if DocumentEvaluator::new(document).matches(&filter)? {
                matched.push(index);
                if cardinality == Cardinality::Single {
                    break;
                }
            }
        }

        for index in matched.iter().rev() {
            stored.remove(*index);
        }

        Ok(matched.len() as u64)
    }

    async fn count(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> BridgeResult<u64> {
        let store = self.store.read().await;

        let counted = match store.get(collection) {
            Some(documents) => Self::select(documents, &filter, &options, None)?.len(),
            None => 0,
        };

        Ok(counted as u64)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
        _options: Document,
    ) -> BridgeResult<Vec<Document>> {
        let documents = self.documents(collection).await;

        run_pipeline(documents, &pipeline)
    }
}

/// Builder for [`InMemoryDriver`] instances.
///
/// # Example
///
/// ```ignore
/// use mongobridge_memory::InMemoryDriver;
/// use mongobridge_core::backend::DriverBuilder;
/// use bson::doc;
///
/// let driver = InMemoryDriver::builder()
///     .with_collection("players", vec![doc! { "name": "Bob" }])
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDriverBuilder {
    seed: StoreMap,
}

impl InMemoryDriverBuilder {
    /// Preloads `documents` into `collection`. Missing `_id` fields are generated.
    pub fn with_collection(mut self, collection: &str, documents: Vec<Document>) -> Self {
        self.seed
            .entry(collection.to_string())
            .or_default()
            .extend(documents.into_iter().map(|doc| ensure_id(doc).1));
        self
    }
}

#[async_trait]
impl DriverBuilder for InMemoryDriverBuilder {
    type Driver = InMemoryDriver;

    async fn build(self) -> BridgeResult<Self::Driver> {
        Ok(InMemoryDriver {
            store: Arc::new(RwLock::new(self.seed)),
        })
    }
}

//! Operation dispatchers exposed to the scripting host.
//!
//! Every dispatcher runs the same pipeline: readiness check, parameter validation,
//! collection resolution, driver call, result normalization. A call completes once,
//! with a [`Completion`]; the optional callback and the returned value are two
//! observers of that completion.
//!
//! Failures never escape as errors. They are logged and the call returns `false`;
//! callbacks only fire on success unless [`BridgeSettings::report_errors`] is set.
//!
//! # Example
//!
//! ```ignore
//! use mongobridge::{prelude::*, memory::InMemoryDriver};
//! use serde_json::json;
//!
//! let bridge = Bridge::new(ConnectionProvider::with_driver(InMemoryDriver::new(), "fivem"));
//!
//! let id = bridge
//!     .insert_one(&json!({ "collection": "players", "document": { "name": "Bob" } }), None)
//!     .await;
//! ```

use std::{future::Future, sync::Arc};

use serde_json::{Value, json};
use tracing::{debug, error};

use crate::{
    backend::{Cardinality, DriverBackend},
    config::BridgeSettings,
    error::{BridgeError, BridgeResult},
    export::{export_document, export_documents, id_to_string, raw_document, raw_documents},
    exports::Export,
    params::Params,
    provider::ConnectionProvider,
};

/// Continuation registered by a script. Receives `true` followed by the result values.
pub type Callback = Box<dyn FnOnce(Vec<Value>) + Send + 'static>;

/// The single completion of a host call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    args: Option<Vec<Value>>,
    value: Value,
}

impl Completion {
    /// A completion delivered to the callback as `args` and returned as `value`.
    pub fn new(args: Vec<Value>, value: Value) -> Self {
        Self {
            args: Some(args),
            value,
        }
    }

    /// A completion that is only returned; no callback is involved.
    pub fn returned(value: Value) -> Self {
        Self { args: None, value }
    }

    fn deliver(self, callback: Option<Callback>) -> Value {
        if let (Some(args), Some(callback)) = (self.args, callback) {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(Value::Bool(true));
            full.extend(args);
            callback(full);
        }

        self.value
    }
}

/// The data access façade.
///
/// Cheap to clone; clones share the same [`ConnectionProvider`].
#[derive(Debug, Clone)]
pub struct Bridge {
    provider: Arc<ConnectionProvider>,
    settings: BridgeSettings,
}

impl Bridge {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    pub fn with_provider(provider: Arc<ConnectionProvider>) -> Self {
        Self {
            provider,
            settings: BridgeSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn provider(&self) -> &Arc<ConnectionProvider> {
        &self.provider
    }

    /// `isConnected`: whether the shared connection is established.
    pub fn is_connected(&self) -> bool {
        self.provider.is_ready()
    }

    /// `insert`: inserts `params.documents`.
    ///
    /// Callback: `true, insertedCount, ids`. Returns `ids`, where `ids[i]` is the id of
    /// the i-th input document.
    pub async fn insert(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.dispatch(
            Export::Insert,
            params,
            callback,
            Params::insert_many_request,
            |driver, request| async move {
                let expected = request.documents.len();
                let outcome = driver
                    .insert_many(&request.collection, request.documents, request.options)
                    .await?;

                let mut ids = vec![Value::Null; expected];
                for (index, id) in outcome.inserted_ids {
                    if let Some(slot) = ids.get_mut(index) {
                        *slot = Value::String(id_to_string(&id));
                    }
                }

                Ok(Completion::new(
                    vec![json!(outcome.inserted_count), Value::Array(ids.clone())],
                    Value::Array(ids),
                ))
            },
        )
        .await
    }

    /// `insertOne`: inserts `params.document`. Callback: `true, id`. Returns `id`.
    pub async fn insert_one(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.dispatch(
            Export::InsertOne,
            params,
            callback,
            Params::insert_one_request,
            |driver, request| async move {
                let id = driver
                    .insert_one(&request.collection, request.document, request.options)
                    .await?;
                let id = Value::String(id_to_string(&id));

                Ok(Completion::new(vec![id.clone()], id))
            },
        )
        .await
    }

    /// `find`: documents matching `params.query`, capped by `params.limit`.
    ///
    /// Callback: `true, documents`. Returns the same exported documents.
    pub async fn find(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.dispatch(
            Export::Find,
            params,
            callback,
            Params::find_request,
            |driver, request| async move {
                let documents = driver
                    .find(&request.collection, request.filter, request.options, request.limit)
                    .await?;
                let exported = export_documents(documents);

                Ok(Completion::new(vec![exported.clone()], exported))
            },
        )
        .await
    }

    /// `findOne`: first document matching `params.query`.
    ///
    /// Callback: `true, [document]` with the exported document or `null`. Returns the
    /// document without the export transform, or `null`.
    pub async fn find_one(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.dispatch(
            Export::FindOne,
            params,
            callback,
            Params::find_request,
            |driver, request| async move {
                let document = driver
                    .find_one(&request.collection, request.filter, request.options)
                    .await?;

                Ok(match document {
                    Some(document) => Completion::new(
                        vec![json!([export_document(document.clone())])],
                        raw_document(document),
                    ),
                    None => Completion::new(vec![json!([null])], Value::Null),
                })
            },
        )
        .await
    }

    /// `update`: applies `params.update` (or `params.pipeline`) to every match.
    pub async fn update(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.update_with(Export::Update, Cardinality::Many, params, callback)
            .await
    }

    /// `updateOne`: applies `params.update` (or `params.pipeline`) to the first match.
    pub async fn update_one(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.update_with(Export::UpdateOne, Cardinality::Single, params, callback)
            .await
    }

    /// `count`: number of documents matching `params.query`. Callback: `true, count`.
    pub async fn count(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.dispatch(
            Export::Count,
            params,
            callback,
            Params::find_request,
            |driver, request| async move {
                let count = driver
                    .count(&request.collection, request.filter, request.options)
                    .await?;

                Ok(Completion::new(vec![json!(count)], json!(count)))
            },
        )
        .await
    }

    /// `delete`: removes every match of `params.query`.
    pub async fn delete(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.delete_with(Export::Delete, Cardinality::Many, params, callback)
            .await
    }

    /// `deleteOne`: removes the first match of `params.query`.
    pub async fn delete_one(&self, params: &Value, callback: Option<Callback>) -> Value {
        self.delete_with(Export::DeleteOne, Cardinality::Single, params, callback)
            .await
    }

    /// `aggregate`: runs `params.pipeline`. Returns every result document; no callback.
    pub async fn aggregate(&self, params: &Value) -> Value {
        self.dispatch(
            Export::Aggregate,
            params,
            None,
            Params::aggregate_request,
            |driver, request| async move {
                let documents = driver
                    .aggregate(&request.collection, request.pipeline, request.options)
                    .await?;

                Ok(Completion::returned(raw_documents(documents)))
            },
        )
        .await
    }

    /// `bulkWrite`: executes `params.operations`. Returns the write summary; no callback.
    pub async fn bulk_write(&self, params: &Value) -> Value {
        self.dispatch(
            Export::BulkWrite,
            params,
            None,
            Params::bulk_write_request,
            |driver, request| async move {
                let summary = driver
                    .bulk_write(&request.collection, request.operations, request.ordered)
                    .await?;

                Ok(Completion::returned(serde_json::to_value(summary)?))
            },
        )
        .await
    }

    async fn update_with(
        &self,
        export: Export,
        cardinality: Cardinality,
        params: &Value,
        callback: Option<Callback>,
    ) -> Value {
        let parse = move |params: Params| params.update_request(cardinality);

        self.dispatch(export, params, callback, parse, |driver, request| async move {
            let outcome = driver
                .update(
                    &request.collection,
                    request.filter,
                    request.update,
                    request.options,
                    request.cardinality,
                )
                .await?;

            Ok(Completion::new(
                vec![json!(outcome.modified_count)],
                json!(outcome.modified_count),
            ))
        })
        .await
    }

    async fn delete_with(
        &self,
        export: Export,
        cardinality: Cardinality,
        params: &Value,
        callback: Option<Callback>,
    ) -> Value {
        let parse = move |params: Params| params.delete_request(cardinality);

        self.dispatch(export, params, callback, parse, |driver, request| async move {
            let deleted = driver
                .delete(
                    &request.collection,
                    request.filter,
                    request.options,
                    request.cardinality,
                )
                .await?;

            Ok(Completion::new(vec![json!(deleted)], json!(deleted)))
        })
        .await
    }

    async fn dispatch<R, P, F, Fut>(
        &self,
        export: Export,
        params: &Value,
        callback: Option<Callback>,
        parse: P,
        run: F,
    ) -> Value
    where
        P: FnOnce(Params) -> BridgeResult<R>,
        F: FnOnce(Arc<dyn DriverBackend>, R) -> Fut,
        Fut: Future<Output = BridgeResult<Completion>>,
    {
        let Some(driver) = self.provider.driver() else {
            error!(%export, "{}", BridgeError::NotReady);
            return Value::Bool(false);
        };

        let request = match Params::parse(params).and_then(parse) {
            Ok(request) => request,
            Err(err) => {
                error!(%export, "(exports.{export}) {err}");
                return Value::Bool(false);
            }
        };

        match run(driver, request).await {
            Ok(completion) => {
                debug!(%export, "completed");
                completion.deliver(callback)
            }
            Err(err) => {
                error!(%export, "(exports.{export}) Error \"{err}\".");
                if self.settings.report_errors {
                    if let Some(callback) = callback {
                        callback(vec![Value::Bool(false), Value::String(err.to_string())]);
                    }
                }
                Value::Bool(false)
            }
        }
    }
}

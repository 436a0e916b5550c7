//! Validation of host parameter objects.
//!
//! Scripts pass a loosely typed object to every export. [`Params`] checks the parts
//! shared by all operations and the `*_request` methods build the typed request of
//! one operation, failing before any driver is touched.

use bson::{Bson, Document, oid::ObjectId};
use serde_json::{Map, Value};

use crate::{
    backend::{Cardinality, UpdateSpec, WriteOperation},
    error::{BridgeError, BridgeResult},
};

/// A validated parameter object with its resolved collection name.
#[derive(Debug, Clone)]
pub struct Params {
    collection: String,
    fields: Map<String, Value>,
}

impl Params {
    /// Checks that `value` is an object naming a valid collection.
    pub fn parse(value: &Value) -> BridgeResult<Self> {
        let Value::Object(fields) = value else {
            return Err(BridgeError::InvalidParams);
        };

        let collection = resolve_collection(fields.get("collection"))?;

        Ok(Self {
            collection,
            fields: fields.clone(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .get(field)
            .filter(|value| !value.is_null())
    }

    fn object(&self, field: &str) -> BridgeResult<Document> {
        safe_object_argument(self.get(field))
    }

    fn options(&self) -> BridgeResult<Document> {
        self.object("options")
    }

    fn documents(&self, field: &'static str) -> BridgeResult<Vec<Document>> {
        const EXPECTED: &str = "an array of objects";

        match self.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(_) => to_document(item),
                    _ => Err(BridgeError::invalid_field(field, EXPECTED)),
                })
                .collect(),
            _ => Err(BridgeError::invalid_field(field, EXPECTED)),
        }
    }

    /// Positive integer `limit`; anything else means no cap.
    fn limit(&self) -> Option<i64> {
        self.get("limit")
            .and_then(Value::as_i64)
            .filter(|limit| *limit > 0)
    }

    pub fn insert_many_request(self) -> BridgeResult<InsertManyRequest> {
        Ok(InsertManyRequest {
            documents: self.documents("documents")?,
            options: self.options()?,
            collection: self.collection,
        })
    }

    pub fn insert_one_request(self) -> BridgeResult<InsertOneRequest> {
        Ok(InsertOneRequest {
            document: self.object("document")?,
            options: self.options()?,
            collection: self.collection,
        })
    }

    pub fn find_request(self) -> BridgeResult<FindRequest> {
        Ok(FindRequest {
            filter: self.object("query")?,
            options: self.options()?,
            limit: self.limit(),
            collection: self.collection,
        })
    }

    pub fn update_request(self, cardinality: Cardinality) -> BridgeResult<UpdateRequest> {
        let update = match self.get("pipeline") {
            Some(_) => UpdateSpec::Pipeline(self.documents("pipeline")?),
            None => match self.get("update") {
                Some(Value::Object(_)) => UpdateSpec::Document(self.object("update")?),
                _ => {
                    return Err(BridgeError::invalid_field(
                        "update",
                        "an object or a 'params.pipeline' array",
                    ));
                }
            },
        };

        Ok(UpdateRequest {
            filter: self.object("query")?,
            update,
            options: self.options()?,
            cardinality,
            collection: self.collection,
        })
    }

    pub fn delete_request(self, cardinality: Cardinality) -> BridgeResult<DeleteRequest> {
        Ok(DeleteRequest {
            filter: self.object("query")?,
            options: self.options()?,
            cardinality,
            collection: self.collection,
        })
    }

    pub fn aggregate_request(self) -> BridgeResult<AggregateRequest> {
        Ok(AggregateRequest {
            pipeline: self.documents("pipeline")?,
            options: self.options()?,
            collection: self.collection,
        })
    }

    pub fn bulk_write_request(self) -> BridgeResult<BulkWriteRequest> {
        let Some(Value::Array(items)) = self.get("operations") else {
            return Err(BridgeError::invalid_field("operations", "an array of write operations"));
        };

        let operations = items
            .iter()
            .map(write_operation)
            .collect::<BridgeResult<Vec<_>>>()?;

        let ordered = self
            .options()?
            .get_bool("ordered")
            .unwrap_or(true);

        Ok(BulkWriteRequest {
            operations,
            ordered,
            collection: self.collection,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertManyRequest {
    pub collection: String,
    pub documents: Vec<Document>,
    pub options: Document,
}

#[derive(Debug, Clone)]
pub struct InsertOneRequest {
    pub collection: String,
    pub document: Document,
    pub options: Document,
}

/// Shared by find, find-one and count.
#[derive(Debug, Clone)]
pub struct FindRequest {
    pub collection: String,
    pub filter: Document,
    pub options: Document,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub collection: String,
    pub filter: Document,
    pub update: UpdateSpec,
    pub options: Document,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub collection: String,
    pub filter: Document,
    pub options: Document,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone)]
pub struct AggregateRequest {
    pub collection: String,
    pub pipeline: Vec<Document>,
    pub options: Document,
}

#[derive(Debug, Clone)]
pub struct BulkWriteRequest {
    pub collection: String,
    pub operations: Vec<WriteOperation>,
    pub ordered: bool,
}

/// Resolves the `collection` field to a collection name.
///
/// Follows the server's naming rules: non-empty, no `$` or NUL, not in the
/// `system.` namespace.
pub fn resolve_collection(value: Option<&Value>) -> BridgeResult<String> {
    match value {
        Some(Value::String(name))
            if !name.is_empty()
                && !name.contains(['$', '\0'])
                && !name.starts_with("system.") =>
        {
            Ok(name.clone())
        }
        Some(Value::String(name)) => Err(BridgeError::InvalidCollection(name.clone())),
        Some(other) => Err(BridgeError::InvalidCollection(other.to_string())),
        None => Err(BridgeError::InvalidCollection("undefined".to_string())),
    }
}

/// Converts an optional host value into a document, never failing on shape.
///
/// Missing and scalar values become an empty document, arrays become documents keyed
/// by index, objects are read as extended JSON. A top-level `_id` holding an ObjectId
/// hex string is converted to an ObjectId.
pub fn safe_object_argument(value: Option<&Value>) -> BridgeResult<Document> {
    let mut document = match value {
        Some(object @ Value::Object(_)) => to_document(object)?,
        Some(Value::Array(items)) => {
            let keyed = items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item.clone()))
                .collect::<Map<_, _>>();
            to_document(&Value::Object(keyed))?
        }
        _ => Document::new(),
    };

    let object_id = match document.get("_id") {
        Some(Bson::String(hex)) => ObjectId::parse_str(hex).ok(),
        _ => None,
    };
    if let Some(oid) = object_id {
        document.insert("_id", oid);
    }

    Ok(document)
}

fn to_document(value: &Value) -> BridgeResult<Document> {
    match Bson::try_from(value.clone()) {
        Ok(Bson::Document(document)) => Ok(document),
        Ok(other) => Err(BridgeError::Serialization(format!(
            "expected an object, found {other}"
        ))),
        Err(err) => Err(BridgeError::Serialization(err.to_string())),
    }
}

fn write_operation(value: &Value) -> BridgeResult<WriteOperation> {
    const EXPECTED: &str =
        "single-key objects (insertOne, updateOne, updateMany, replaceOne, deleteOne, deleteMany)";

    let invalid = || BridgeError::invalid_field("operations", EXPECTED);

    let Value::Object(descriptor) = value else {
        return Err(invalid());
    };
    let mut entries = descriptor.iter();
    let (Some((kind, Value::Object(body))), None) = (entries.next(), entries.next()) else {
        return Err(invalid());
    };

    let filter = || safe_object_argument(body.get("filter"));
    let upsert = body
        .get("upsert")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match kind.as_str() {
        "insertOne" => Ok(WriteOperation::InsertOne {
            document: safe_object_argument(body.get("document"))?,
        }),
        "updateOne" | "updateMany" => {
            let update = match body.get("update") {
                Some(Value::Array(stages)) => UpdateSpec::Pipeline(
                    stages
                        .iter()
                        .map(to_document)
                        .collect::<BridgeResult<Vec<_>>>()?,
                ),
                Some(Value::Object(_)) => {
                    UpdateSpec::Document(safe_object_argument(body.get("update"))?)
                }
                _ => return Err(invalid()),
            };

            Ok(WriteOperation::Update {
                filter: filter()?,
                update,
                upsert,
                cardinality: if kind == "updateOne" {
                    Cardinality::Single
                } else {
                    Cardinality::Many
                },
            })
        }
        "replaceOne" => match body.get("replacement") {
            Some(Value::Object(_)) => Ok(WriteOperation::ReplaceOne {
                filter: filter()?,
                replacement: safe_object_argument(body.get("replacement"))?,
                upsert,
            }),
            _ => Err(invalid()),
        },
        "deleteOne" => Ok(WriteOperation::Delete {
            filter: filter()?,
            cardinality: Cardinality::Single,
        }),
        "deleteMany" => Ok(WriteOperation::Delete {
            filter: filter()?,
            cardinality: Cardinality::Many,
        }),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_params_must_be_an_object() {
        for value in [Value::Null, json!(42), json!("players"), json!([1, 2])] {
            assert!(matches!(Params::parse(&value), Err(BridgeError::InvalidParams)));
        }
    }

    #[test]
    fn test_collection_resolution() {
        assert_eq!(resolve_collection(Some(&json!("players"))).unwrap(), "players");

        for value in [json!(""), json!("bad$name"), json!("system.users"), json!(3)] {
            assert!(matches!(
                resolve_collection(Some(&value)),
                Err(BridgeError::InvalidCollection(_))
            ));
        }
        assert!(resolve_collection(None).is_err());
    }

    #[test]
    fn test_safe_object_argument_defaults() {
        assert_eq!(safe_object_argument(None).unwrap(), Document::new());
        assert_eq!(safe_object_argument(Some(&json!(false))).unwrap(), Document::new());
        assert_eq!(safe_object_argument(Some(&json!("text"))).unwrap(), Document::new());
        assert_eq!(
            safe_object_argument(Some(&json!(["a", "b"]))).unwrap(),
            doc! { "0": "a", "1": "b" }
        );
    }

    #[test]
    fn test_safe_object_argument_converts_hex_id() {
        let oid = ObjectId::new();
        let document = safe_object_argument(Some(&json!({ "_id": oid.to_hex() }))).unwrap();
        assert_eq!(document.get_object_id("_id").unwrap(), oid);

        let document = safe_object_argument(Some(&json!({ "_id": "steam:110000" }))).unwrap();
        assert_eq!(document.get_str("_id").unwrap(), "steam:110000");
    }

    #[test]
    fn test_insert_many_requires_array_of_objects() {
        let params = Params::parse(&json!({ "collection": "players", "documents": { "a": 1 } })).unwrap();
        assert!(matches!(
            params.insert_many_request(),
            Err(BridgeError::InvalidField { field: "documents", .. })
        ));

        let params = Params::parse(&json!({ "collection": "players", "documents": [{ "a": 1 }, 2] })).unwrap();
        assert!(params.insert_many_request().is_err());

        let params = Params::parse(&json!({ "collection": "players", "documents": [{ "a": 1 }] })).unwrap();
        let request = params.insert_many_request().unwrap();
        assert_eq!(request.documents, vec![doc! { "a": 1 }]);
        assert_eq!(request.options, Document::new());
    }

    #[test]
    fn test_find_limit_only_when_positive() {
        let request = Params::parse(&json!({ "collection": "players" }))
            .unwrap()
            .find_request()
            .unwrap();
        assert_eq!(request.limit, None);
        assert_eq!(request.filter, Document::new());
        assert_eq!(request.options, Document::new());

        let request = Params::parse(&json!({ "collection": "players", "limit": 5 }))
            .unwrap()
            .find_request()
            .unwrap();
        assert_eq!(request.limit, Some(5));

        let request = Params::parse(&json!({ "collection": "players", "limit": 0 }))
            .unwrap()
            .find_request()
            .unwrap();
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_sort_keys_keep_host_order() {
        let request = Params::parse(&json!({
            "collection": "players",
            "options": { "sort": { "name": 1, "cash": -1, "age": 1 } },
        }))
        .unwrap()
        .find_request()
        .unwrap();

        let sort = request.options.get_document("sort").unwrap();
        assert_eq!(sort.keys().collect::<Vec<_>>(), vec!["name", "cash", "age"]);
        assert_eq!(sort, &doc! { "name": 1, "cash": -1, "age": 1 });
    }

    #[test]
    fn test_update_prefers_pipeline() {
        let request = Params::parse(&json!({
            "collection": "players",
            "query": { "name": "Bob" },
            "update": { "$set": { "cash": 1 } },
            "pipeline": [{ "$set": { "cash": 2 } }],
        }))
        .unwrap()
        .update_request(Cardinality::Single)
        .unwrap();

        assert_eq!(request.update, UpdateSpec::Pipeline(vec![doc! { "$set": { "cash": 2 } }]));
        assert_eq!(request.cardinality, Cardinality::Single);
    }

    #[test]
    fn test_update_requires_modification() {
        let params = Params::parse(&json!({ "collection": "players", "query": {} })).unwrap();
        assert!(matches!(
            params.update_request(Cardinality::Many),
            Err(BridgeError::InvalidField { field: "update", .. })
        ));
    }

    #[test]
    fn test_aggregate_requires_pipeline() {
        let params = Params::parse(&json!({ "collection": "players" })).unwrap();
        assert!(matches!(
            params.aggregate_request(),
            Err(BridgeError::InvalidField { field: "pipeline", .. })
        ));
    }

    #[test]
    fn test_bulk_write_descriptors() {
        let request = Params::parse(&json!({
            "collection": "vehicles",
            "operations": [
                { "insertOne": { "document": { "plate": "ABC" } } },
                { "updateMany": { "filter": { "stored": true }, "update": { "$set": { "stored": false } }, "upsert": true } },
                { "replaceOne": { "filter": { "plate": "ABC" }, "replacement": { "plate": "XYZ" } } },
                { "deleteOne": { "filter": { "plate": "XYZ" } } },
            ],
            "options": { "ordered": false },
        }))
        .unwrap()
        .bulk_write_request()
        .unwrap();

        assert!(!request.ordered);
        assert_eq!(request.operations.len(), 4);
        assert_eq!(
            request.operations[1],
            WriteOperation::Update {
                filter: doc! { "stored": true },
                update: UpdateSpec::Document(doc! { "$set": { "stored": false } }),
                upsert: true,
                cardinality: Cardinality::Many,
            }
        );
        assert_eq!(
            request.operations[3],
            WriteOperation::Delete {
                filter: doc! { "plate": "XYZ" },
                cardinality: Cardinality::Single,
            }
        );
    }

    #[test]
    fn test_bulk_write_rejects_unknown_descriptor() {
        let params = Params::parse(&json!({
            "collection": "vehicles",
            "operations": [{ "dropCollection": {} }],
        }))
        .unwrap();
        assert!(params.bulk_write_request().is_err());

        let params = Params::parse(&json!({ "collection": "vehicles" })).unwrap();
        assert!(matches!(
            params.bulk_write_request(),
            Err(BridgeError::InvalidField { field: "operations", .. })
        ));
    }
}

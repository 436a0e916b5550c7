//! Conversion of driver results into values the scripting host can hold.
//!
//! The host only understands plain JSON-like data. Documents leaving the façade are
//! rendered as relaxed extended JSON; the export transform additionally turns every
//! ObjectId into its hex string so scripts can compare and store ids as strings.

use bson::{Bson, Document};
use serde_json::Value;

/// Renders an inserted or upserted id the way scripts expect to read it.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

/// Exports a document for delivery to a script.
pub fn export_document(document: Document) -> Value {
    stringify_object_ids(Bson::Document(document)).into_relaxed_extjson()
}

/// Exports every document of a result set, preserving order.
pub fn export_documents(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(export_document).collect())
}

/// Renders a document without the export transform.
pub fn raw_document(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

pub fn raw_documents(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(raw_document).collect())
}

fn stringify_object_ids(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Array(items) => Bson::Array(items.into_iter().map(stringify_object_ids).collect()),
        Bson::Document(doc) => Bson::Document(
            doc.into_iter()
                .map(|(k, v)| (k, stringify_object_ids(v)))
                .collect(),
        ),
        other => other,
    }
}

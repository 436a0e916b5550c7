//! Mapping of host option objects onto the driver's typed option structs.
//!
//! Keys use the driver's wire names (`maxTimeMS`, `arrayFilters`, `let`, ...).
//! Unknown keys are ignored. A known key holding a value of the wrong type
//! discards the whole options object for that call.

use bson::Document;
use mongodb::options::{
    AggregateOptions, CountOptions, DeleteOptions, FindOneOptions, FindOptions,
    InsertManyOptions, InsertOneOptions, ReplaceOptions, UpdateOptions,
};
use serde::de::DeserializeOwned;
use tracing::warn;

fn typed<T: DeserializeOwned + Default>(options: &Document) -> T {
    if options.is_empty() {
        return T::default();
    }

    bson::deserialize_from_document(options.clone()).unwrap_or_else(|e| {
        warn!(
            options = std::any::type_name::<T>(),
            error = %e,
            "ignoring malformed options"
        );
        T::default()
    })
}

/// `limit` from the call overrides `options.limit`.
pub(crate) fn find_options(options: &Document, limit: Option<i64>) -> FindOptions {
    let mut find: FindOptions = typed(options);

    if limit.is_some() {
        find.limit = limit;
    }

    find
}

pub(crate) fn find_one_options(options: &Document) -> FindOneOptions {
    typed(options)
}

pub(crate) fn insert_many_options(options: &Document) -> InsertManyOptions {
    typed(options)
}

pub(crate) fn insert_one_options(options: &Document) -> InsertOneOptions {
    typed(options)
}

pub(crate) fn update_options(options: &Document) -> UpdateOptions {
    typed(options)
}

pub(crate) fn replace_options(options: &Document) -> ReplaceOptions {
    typed(options)
}

pub(crate) fn delete_options(options: &Document) -> DeleteOptions {
    typed(options)
}

pub(crate) fn count_options(options: &Document) -> CountOptions {
    typed(options)
}

pub(crate) fn aggregate_options(options: &Document) -> AggregateOptions {
    typed(options)
}

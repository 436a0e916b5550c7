use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{Client, Collection as MongoCollection, options::ClientOptions};
use tracing::{debug, info};

use mongobridge_core::{
    backend::{
        Cardinality, DriverBackend, DriverBuilder, InsertManyOutcome, UpdateOutcome, UpdateSpec,
    },
    error::{BridgeError, BridgeResult},
};

use crate::options::{
    aggregate_options, count_options, delete_options, find_one_options, find_options,
    insert_many_options, insert_one_options, replace_options, update_options,
};

fn driver_error(err: mongodb::error::Error) -> BridgeError {
    BridgeError::Driver(err.to_string())
}

#[derive(Debug, Clone)]
pub struct MongoDriver {
    client: Client,
    database: String,
}

impl MongoDriver {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(url: &str, database: &str) -> MongoDriverBuilder {
        MongoDriverBuilder::new(url, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    async fn ping(&self) -> BridgeResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl DriverBackend for MongoDriver {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: Document,
    ) -> BridgeResult<InsertManyOutcome> {
        let result = self
            .get_collection(collection)
            .insert_many(documents)
            .with_options(insert_many_options(&options))
            .await
            .map_err(driver_error)?;

        Ok(InsertManyOutcome {
            inserted_count: result.inserted_ids.len() as u64,
            inserted_ids: result.inserted_ids,
        })
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: Document,
    ) -> BridgeResult<Bson> {
        Ok(self
            .get_collection(collection)
            .insert_one(document)
            .with_options(insert_one_options(&options))
            .await
            .map_err(driver_error)?
            .inserted_id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        limit: Option<i64>,
    ) -> BridgeResult<Vec<Document>> {
        self.get_collection(collection)
            .find(filter)
            .with_options(find_options(&options, limit))
            .await
            .map_err(driver_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(driver_error)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> BridgeResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(filter)
            .with_options(find_one_options(&options))
            .await
            .map_err(driver_error)
    }

    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: UpdateSpec,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<UpdateOutcome> {
        let coll = self.get_collection(collection);
        let options = update_options(&options);

        let result = match (update, cardinality) {
            (UpdateSpec::Document(update), Cardinality::Single) => {
                coll.update_one(filter, update).with_options(options).await
            }
            (UpdateSpec::Document(update), Cardinality::Many) => {
                coll.update_many(filter, update).with_options(options).await
            }
            (UpdateSpec::Pipeline(pipeline), Cardinality::Single) => {
                coll.update_one(filter, pipeline).with_options(options).await
            }
            (UpdateSpec::Pipeline(pipeline), Cardinality::Many) => {
                coll.update_many(filter, pipeline).with_options(options).await
            }
        }
        .map_err(driver_error)?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Document,
    ) -> BridgeResult<UpdateOutcome> {
        let result = self
            .get_collection(collection)
            .replace_one(filter, replacement)
            .with_options(replace_options(&options))
            .await
            .map_err(driver_error)?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
        cardinality: Cardinality,
    ) -> BridgeResult<u64> {
        let coll = self.get_collection(collection);
        let options = delete_options(&options);

        let result = match cardinality {
            Cardinality::Single => coll.delete_one(filter).with_options(options).await,
            Cardinality::Many => coll.delete_many(filter).with_options(options).await,
        }
        .map_err(driver_error)?;

        Ok(result.deleted_count)
    }

    async fn count(
        &self,
        collection: &str,
        filter: Document,
        options: Document,
    ) -> BridgeResult<u64> {
        self.get_collection(collection)
            .count_documents(filter)
            .with_options(count_options(&options))
            .await
            .map_err(driver_error)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
        options: Document,
    ) -> BridgeResult<Vec<Document>> {
        self.get_collection(collection)
            .aggregate(pipeline)
            .with_options(aggregate_options(&options))
            .await
            .map_err(driver_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(driver_error)
    }
}

/// Connects a [`MongoDriver`]: parses the URL, creates the client and checks the
/// server answers a ping before the handle is handed out.
#[derive(Debug)]
pub struct MongoDriverBuilder {
    url: String,
    database: String,
}

impl MongoDriverBuilder {
    pub fn new(url: &str, database: &str) -> Self {
        Self {
            url: url.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl DriverBuilder for MongoDriverBuilder {
    type Driver = MongoDriver;

    async fn build(self) -> BridgeResult<Self::Driver> {
        let options = ClientOptions::parse(&self.url)
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;
        debug!(hosts = ?options.hosts, "parsed connection string");

        let driver = MongoDriver::new(
            Client::with_options(options).map_err(|e| BridgeError::Connection(e.to_string()))?,
            self.database,
        );

        driver.ping().await?;
        info!(database = %driver.database, "server answered ping");

        Ok(driver)
    }
}

//! MongoDB-backed document store.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson},
    options::ClientOptions,
    Client, Collection, Database,
};
use serde_json::Value;

use super::store::{Document, DocumentStore, Filter, FindOptions, Sort, SortOrder, StoreError};
use super::DbConfig;

pub struct MongoStore {
    db: Database,
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl MongoStore {
    /// Builds a client from the connection string. The driver connects
    /// lazily, so this only fails on a malformed URL or options.
    pub async fn connect(url: &str, config: &DbConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(url).await?;
        options.app_name = Some("cms-backend".to_string());
        options.max_pool_size = Some(config.max_connections);
        options.min_pool_size = Some(config.min_connections);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));

        let client = Client::with_options(options)?;
        Ok(Self {
            db: client.database(&config.name),
        })
    }

    fn collection(&self, name: &str) -> Collection<bson::Document> {
        self.db.collection(name)
    }
}

fn to_bson(doc: &Document) -> Result<bson::Document, StoreError> {
    bson::to_document(doc).map_err(|e| StoreError::Encoding(e.to_string()))
}

fn from_bson(mut doc: bson::Document) -> Result<Document, StoreError> {
    doc.remove("_id");
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Encoding(format!(
            "expected an object, got {other}"
        ))),
    }
}

fn filter_to_bson(filter: &Filter) -> Result<bson::Document, StoreError> {
    let mut query = bson::Document::new();
    for (field, value) in &filter.equals {
        let value = bson::to_bson(value).map_err(|e| StoreError::Encoding(e.to_string()))?;
        query.insert(field.clone(), value);
    }

    if let Some(search) = &filter.search {
        let pattern = regex::escape(&search.term);
        let clauses: Vec<Bson> = search
            .fields
            .iter()
            .map(|field| {
                Bson::Document(doc! {
                    field.as_str(): { "$regex": pattern.as_str(), "$options": "i" }
                })
            })
            .collect();
        query.insert("$or", clauses);
    }

    Ok(query)
}

fn sort_to_bson(sort: &Sort) -> bson::Document {
    let direction = match sort.order {
        SortOrder::Ascending => 1,
        SortOrder::Descending => -1,
    };
    doc! { sort.field.as_str(): direction }
}

fn no_id() -> bson::Document {
    doc! { "_id": 0 }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut action = coll
            .find(filter_to_bson(filter)?)
            .projection(no_id())
            .skip(options.skip);

        if let Some(sort) = &options.sort {
            action = action.sort(sort_to_bson(sort));
        }
        if let Some(limit) = options.limit {
            action = action.limit(limit);
        }

        let docs: Vec<bson::Document> = action.await?.try_collect().await?;
        docs.into_iter().map(from_bson).collect()
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .find_one(filter_to_bson(filter)?)
            .projection(no_id())
            .await?
            .map(from_bson)
            .transpose()
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<(), StoreError> {
        self.collection(collection).insert_one(to_bson(&doc)?).await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }
        let docs = docs.iter().map(to_bson).collect::<Result<Vec<_>, _>>()?;
        self.collection(collection).insert_many(docs).await?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .update_one(filter_to_bson(filter)?, doc! { "$set": to_bson(&set)? })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(filter_to_bson(filter)?)
            .await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self
            .collection(collection)
            .count_documents(filter_to_bson(filter)?)
            .await?)
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError> {
        let values = self
            .collection(collection)
            .distinct(field, bson::Document::new())
            .await?;
        Ok(values.into_iter().map(Bson::into_relaxed_extjson).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

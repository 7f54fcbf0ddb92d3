//! Typed access to one collection. Every resource family goes through here
//! so the create/update/read conventions are applied uniformly.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use super::models::UPDATED_AT;
use super::normalize::{from_document, next_stamp, to_document, UpdateSet};
use super::store::{DocumentStore, Filter, FindOptions};
use crate::error::ApiError;

pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Human name used in error messages ("Blog post not found").
    const LABEL: &'static str;

    /// Entities with an `updated_at` field return it here so updates can
    /// refresh it.
    fn last_updated(&self) -> Option<DateTime<Utc>> {
        None
    }
}

pub struct Repository<'a, T> {
    store: &'a dyn DocumentStore,
    _entity: PhantomData<T>,
}

impl<'a, T: Entity> Repository<'a, T> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn not_found() -> ApiError {
        ApiError::NotFound(format!("{} not found", T::LABEL))
    }

    pub async fn list(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<T>, ApiError> {
        self.store
            .find(T::COLLECTION, filter, options)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn find(&self, filter: &Filter) -> Result<Option<T>, ApiError> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn get(&self, filter: &Filter) -> Result<T, ApiError> {
        self.find(filter).await?.ok_or_else(Self::not_found)
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, ApiError> {
        Ok(self.store.count(T::COLLECTION, filter).await?)
    }

    /// Fails with Conflict when a record already holds `value` in `field`.
    ///
    /// Check-then-insert: two concurrent creates with the same key can both
    /// pass this check.
    pub async fn ensure_unique(
        &self,
        field: &str,
        value: &str,
        message: &str,
    ) -> Result<(), ApiError> {
        let existing = self
            .store
            .find_one(T::COLLECTION, &Filter::by(field, value))
            .await?;
        if existing.is_some() {
            return Err(ApiError::Conflict(message.to_string()));
        }
        Ok(())
    }

    pub async fn insert(&self, entity: &T) -> Result<(), ApiError> {
        self.store
            .insert_one(T::COLLECTION, to_document(entity)?)
            .await?;
        Ok(())
    }

    pub async fn insert_many(&self, entities: &[T]) -> Result<usize, ApiError> {
        let docs = entities
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;
        let inserted = docs.len();
        self.store.insert_many(T::COLLECTION, docs).await?;
        Ok(inserted)
    }

    /// Partial update: NotFound when nothing matches, otherwise applies
    /// `set` (plus a fresh update stamp) and returns the stored result.
    pub async fn update(&self, filter: &Filter, set: UpdateSet) -> Result<T, ApiError> {
        let existing = self.get(filter).await?;
        let set = match existing.last_updated() {
            Some(previous) => set.stamp(UPDATED_AT, next_stamp(previous)),
            None => set,
        };

        let matched = self
            .store
            .update_one(T::COLLECTION, filter, set.into_document())
            .await?;
        if matched == 0 {
            return Err(Self::not_found());
        }
        self.get(filter).await
    }

    pub async fn delete(&self, filter: &Filter) -> Result<(), ApiError> {
        let deleted = self.store.delete_one(T::COLLECTION, filter).await?;
        if deleted == 0 {
            return Err(Self::not_found());
        }
        Ok(())
    }
}

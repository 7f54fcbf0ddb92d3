//! Document store abstraction: collection-oriented reads and writes over
//! JSON documents, with equality filters, text search, sort and paging.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record in wire form (flat JSON object, string timestamps).
pub type Document = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("document encoding error: {0}")]
    Encoding(String),
}

/// Case-insensitive literal substring match OR-ed across several fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub fields: Vec<String>,
    pub term: String,
}

/// Conjunction of field equalities plus an optional text search.
/// Field names may be dotted paths into nested objects (`title.en`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub equals: Vec<(String, Value)>,
    pub search: Option<TextSearch>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field equality filter.
    pub fn by(field: &str, value: impl Into<Value>) -> Self {
        Self::new().eq(field, value)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.equals.push((field.to_string(), value.into()));
        self
    }

    /// Adds the equality only when a value is given.
    pub fn eq_opt<V: Into<Value>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    /// Blank terms are ignored.
    pub fn search(mut self, fields: &[&str], term: Option<&str>) -> Self {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            self.search = Some(TextSearch {
                fields: fields.iter().map(|f| f.to_string()).collect(),
                term: term.to_string(),
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty() && self.search.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub skip: u64,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn sorted(field: &str, order: SortOrder) -> Self {
        Self {
            sort: Some(Sort {
                field: field.to_string(),
                order,
            }),
            ..Self::default()
        }
    }

    pub fn page(mut self, skip: u64, limit: i64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Collection-oriented document database. Every call is a single
/// independent operation; there are no transactions across calls.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, collection: &str, filter: &Filter)
        -> Result<Option<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<(), StoreError>;

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError>;

    /// Applies `set` to the first match and returns the matched count.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError>;

    /// Returns the deleted count.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

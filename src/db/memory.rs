//! In-process document store used when no database is configured and by
//! the test suite. Mirrors the filter/sort semantics of the Mongo adapter.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;

use super::store::{Document, DocumentStore, Filter, FindOptions, SortOrder, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolve a dotted path (`title.en`) inside a document.
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn compile_search(filter: &Filter) -> Result<Option<Regex>, StoreError> {
    filter
        .search
        .as_ref()
        .map(|s| {
            Regex::new(&format!("(?i){}", regex::escape(&s.term)))
                .map_err(|e| StoreError::Encoding(e.to_string()))
        })
        .transpose()
}

fn matches(doc: &Document, filter: &Filter, search: Option<&Regex>) -> bool {
    let equal = filter
        .equals
        .iter()
        .all(|(field, expected)| lookup(doc, field) == Some(expected));
    if !equal {
        return false;
    }

    match (&filter.search, search) {
        (Some(text), Some(re)) => text.fields.iter().any(|field| {
            lookup(doc, field)
                .and_then(Value::as_str)
                .is_some_and(|s| re.is_match(s))
        }),
        _ => true,
    }
}

/// Total order over JSON scalars: missing/null < bool < number < string.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let search = compile_search(filter)?;
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, filter, search.as_ref()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if let Some(sort) = &options.sort {
            found.sort_by(|a, b| {
                let ord = compare(lookup(a, &sort.field), lookup(b, &sort.field));
                match sort.order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = match options.limit {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => usize::MAX,
        };
        Ok(found.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let search = compile_search(filter)?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|d| matches(d, filter, search.as_ref()))
                .cloned()
        }))
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError> {
        let search = compile_search(filter)?;
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).and_then(|docs| {
            docs.iter_mut()
                .find(|d| matches(d, filter, search.as_ref()))
        });

        match target {
            Some(doc) => {
                for (field, value) in set {
                    doc.insert(field, value);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let search = compile_search(filter)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matches(d, filter, search.as_ref())) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let search = compile_search(filter)?;
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, filter, search.as_ref()))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let mut values: Vec<Value> = Vec::new();
        for doc in collections.get(collection).into_iter().flatten() {
            if let Some(v) = lookup(doc, field) {
                if !values.contains(v) {
                    values.push(v.clone());
                }
            }
        }
        Ok(values)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

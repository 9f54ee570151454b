//! The document-store seam: named collections of JSON documents.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused this one document; other writes may still succeed.
    #[error("document rejected by '{collection}': {message}")]
    Rejected { collection: String, message: String },

    /// The store cannot be reached at all.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist one document and return its generated id.
    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Every document in a collection, each carrying its `id`, optionally
    /// ordered ascending by one field. Documents lacking the field sort last.
    async fn get_all(
        &self,
        collection: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Process-local store used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .map(|collections| collections.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let stored = with_id(&id, document);
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn get_all(
        &self,
        collection: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut documents = self.lock()?.get(collection).cloned().unwrap_or_default();
        if let Some(field) = order_by {
            documents.sort_by(|a, b| compare_field(a.get(field), b.get(field)));
        }
        Ok(documents)
    }
}

/// Put `id` first, ahead of the stored fields.
pub fn with_id(id: &str, document: Document) -> Document {
    let mut stored = Map::with_capacity(document.len() + 1);
    stored.insert("id".to_string(), Value::String(id.to_string()));
    for (key, value) in document {
        if key != "id" {
            stored.insert(key, value);
        }
    }
    stored
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|value| !value.is_null());
    let b = b.filter(|value| !value.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

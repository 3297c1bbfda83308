use super::{Collection, DocumentStore};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Process-local store, used by tests and for dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .lock()
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn drop_collection(&self, collection: Collection) -> Result<()> {
        self.collections.lock().remove(&collection);
        Ok(())
    }

    async fn insert_many(&self, collection: Collection, documents: Vec<Value>) -> Result<usize> {
        let count = documents.len();
        self.collections
            .lock()
            .entry(collection)
            .or_default()
            .extend(documents);
        Ok(count)
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self
            .collections
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_appends_in_order() {
        let store = MemoryStore::new();
        store
            .insert_many(Collection::Users, vec![json!({"n": 1}), json!({"n": 2})])
            .await
            .unwrap();
        store
            .insert_many(Collection::Users, vec![json!({"n": 3})])
            .await
            .unwrap();

        let docs = store.find_all(Collection::Users).await.unwrap();
        assert_eq!(docs, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
        assert_eq!(store.len(Collection::Wells), 0);
    }

    #[tokio::test]
    async fn drop_clears_only_that_collection() {
        let store = MemoryStore::new();
        store
            .insert_many(Collection::Users, vec![json!({})])
            .await
            .unwrap();
        store
            .insert_many(Collection::Wells, vec![json!({})])
            .await
            .unwrap();

        store.drop_collection(Collection::Users).await.unwrap();
        assert_eq!(store.len(Collection::Users), 0);
        assert_eq!(store.len(Collection::Wells), 1);
    }
}

use super::{ObjectStorage, StorageError};
use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Bucket kept in process memory.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.lock().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put_new(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let mut objects = self.lock();
        if objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://catalog/{}", path)
    }
}

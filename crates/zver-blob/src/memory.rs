//! In-memory blob store for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{BlobError, BlobResult};
use crate::traits::{verify_checksum, BlobStore, PutOptions};

/// One stored object with its write-time metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

/// An in-memory implementation of [`BlobStore`].
///
/// Objects live in a `HashMap` behind a `RwLock`. Puts overwrite, which
/// satisfies both idempotent artifact writes and the last-writer-wins
/// `index.json` contract.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored object with its metadata (for assertions in tests).
    pub fn object(&self, key: &str) -> Option<StoredBlob> {
        self.objects.read().ok()?.get(key).cloned()
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let objects = match self.objects.read() {
            Ok(objects) => objects,
            Err(_) => return Vec::new(),
        };
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> BlobResult<()> {
        verify_checksum(key, &body, options)?;
        let mut objects = self.objects.write().map_err(|_| BlobError::LockPoisoned)?;
        objects.insert(
            key.to_string(),
            StoredBlob {
                data: body,
                content_type: options.content_type.clone(),
                cache_control: options.cache_control.clone(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        let objects = self.objects.read().map_err(|_| BlobError::LockPoisoned)?;
        Ok(objects.get(key).map(|blob| blob.data.clone()))
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        let objects = self.objects.read().map_err(|_| BlobError::LockPoisoned)?;
        Ok(objects.contains_key(key))
    }
}

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{BlobError, BlobResult};

/// Write-time metadata for a stored object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// Lowercase hex SHA-256 of the body, when known at upload time.
    /// Implementations verify it against the body before committing.
    pub sha256: Option<String>,
}

impl PutOptions {
    pub fn json(cache_control: &str) -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            cache_control: Some(cache_control.to_string()),
            sha256: None,
        }
    }
}

/// Key/value store for release tarballs, their signature sidecars, and
/// the published `index.json`.
///
/// All implementations must satisfy these invariants:
/// - Writes are idempotent by key + checksum: re-putting the same bytes
///   at the same key is a no-op, and the single well-known `index.json`
///   key is last-writer-wins.
/// - A supplied checksum that does not match the body fails the write;
///   nothing is committed.
/// - The store never interprets object contents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object at `key`.
    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> BlobResult<()>;

    /// Read an object's bytes. Returns `Ok(None)` if the key is absent.
    async fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> BlobResult<bool>;
}

/// Verify a body against a lowercase-hex SHA-256 checksum, if one was
/// supplied.
pub fn verify_checksum(key: &str, body: &[u8], options: &PutOptions) -> BlobResult<()> {
    let Some(expected) = &options.sha256 else {
        return Ok(());
    };
    let actual = hex::encode(Sha256::digest(body));
    if &actual != expected {
        return Err(BlobError::ChecksumMismatch {
            key: key.to_string(),
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}

//! Filesystem-backed blob store.
//!
//! Stores each object as a file under a root directory. Suitable for a
//! single-host deployment where a web server or CDN origin fronts the
//! directory. Object metadata (content type, cache control) is the CDN's
//! concern and is not persisted here.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{BlobError, BlobResult};
use crate::traits::{verify_checksum, BlobStore, PutOptions};

/// A [`BlobStore`] writing plain files under a root directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Use `root` as the object directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The object directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys are flat file names; anything that would escape the root
    /// directory is rejected.
    fn object_path(&self, key: &str) -> BlobResult<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> BlobResult<()> {
        verify_checksum(key, &body, options)?;
        let path = self.object_path(key)?;
        // Write-then-rename so readers never observe a partial object.
        let staging = self.root.join(format!("{key}.part"));
        tokio::fs::write(&staging, &body).await?;
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        let path = self.object_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        let path = self.object_path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

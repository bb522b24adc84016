use thiserror::Error;

use zver_blob::BlobError;
use zver_store::StoreError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("duplicate artifact target {target} on release {zls_version}")]
    DuplicateTarget { zls_version: String, target: String },

    #[error("release {zls_version} carries an out-of-range date: {date}")]
    InvalidDate { zls_version: String, date: u64 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;

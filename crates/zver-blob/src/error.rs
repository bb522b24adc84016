use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("checksum mismatch for {key}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),

    #[error("blob store lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

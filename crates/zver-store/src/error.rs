use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("release not found: {0}")]
    NotFound(String),

    #[error("corrupt release record {version}: {reason}")]
    CorruptRecord { version: String, reason: String },

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

use thiserror::Error;

use zver_store::StoreError;
use zver_types::TypeError;

/// Infrastructure failures of the read path. Selection outcomes that are
/// part of the wire contract are [`FailureCode`](crate::FailureCode)s,
/// not errors.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("corrupt release data: {0}")]
    Type(#[from] TypeError),
}

pub type SelectResult<T> = Result<T, SelectError>;

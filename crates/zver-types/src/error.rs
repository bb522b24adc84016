use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("unknown compatibility: {0:?} (expected none, only-runtime or full)")]
    UnknownCompatibility(String),

    #[error("unknown artifact extension: {0:?}")]
    UnknownExtension(String),
}

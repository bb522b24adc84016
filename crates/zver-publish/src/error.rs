use thiserror::Error;

use zver_blob::BlobError;
use zver_index::IndexError;
use zver_store::StoreError;

/// Rejection of a publish request. Every variant maps to a user-visible
/// HTTP status: validation failures are 4xx with a message naming the
/// offending field, infrastructure failures are 500.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid {field}: {value:?}")]
    UnparsableVersion { field: &'static str, value: String },

    #[error("unknown compatibility: {0:?} (expected none, only-runtime or full)")]
    UnknownCompatibility(String),

    #[error("invalid artifact file name: {0:?}")]
    InvalidArtifactName(String),

    #[error("artifact {file:?} does not match ZLS version {expected}")]
    ArtifactVersionMismatch { file: String, expected: String },

    #[error("artifact {file:?} shasum must be 64 lowercase hex characters")]
    InvalidShasum { file: String },

    #[error("artifact {file:?} has size zero")]
    EmptyArtifactFile { file: String },

    #[error("artifacts for {os}-{arch} must provide exactly: {expected}")]
    ExtensionSetMismatch {
        os: String,
        arch: String,
        expected: &'static str,
    },

    #[error("tagged release {0} must be built with a tagged Zig version")]
    TaggedWithDevelopmentZig(String),

    #[error("tagged release {0} must include artifacts")]
    TaggedWithoutArtifacts(String),

    #[error("tagged release {0} must be published with full compatibility")]
    TaggedNotFull(String),

    #[error("development build {0} must have patch version 0")]
    DevPatchNonZero(String),

    /// ZLS is pre-1.0; anything else gets the fixed teapot response.
    #[error("ZLS {0} will never exist")]
    UnsupportedRelease(String),

    #[error("no artifacts submitted but compatibility is {0}")]
    MissingArtifacts(String),

    #[error("compatibility is none but artifacts were submitted")]
    NoneWithArtifacts,

    #[error("cannot record a failed build for unknown release {0}")]
    FailedBuildNotUpdatable(String),

    #[error("development build {existing} already occupies this commit height; refusing {submitted}")]
    ConflictingDevCommit { existing: String, submitted: String },

    #[error("signature {0:?} has no matching artifact")]
    UnpairedSignature(String),

    #[error("signatures must cover all artifacts or none")]
    InconsistentSignatures,

    #[error("this instance requires minisign signatures on every artifact")]
    SignaturesRequired,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

impl PublishError {
    /// The HTTP status this rejection surfaces as.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnsupportedRelease(_) => 418,
            Self::Store(_) | Self::Blob(_) | Self::Index(_) => 500,
            _ => 400,
        }
    }
}

pub type PublishResult<T> = Result<T, PublishError>;

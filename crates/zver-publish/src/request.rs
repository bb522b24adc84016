use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A publish request as it arrives on the wire.
///
/// Fields are kept as strings here; [`validate_request`] turns them into
/// domain types with per-field errors. The canonical JSON shape carries
/// artifact metadata only; the legacy multipart transport fills in
/// `body` as well.
///
/// [`validate_request`]: crate::validate_request
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub zls_version: String,
    pub zig_version: String,
    pub minimum_build_zig_version: String,
    pub minimum_runtime_zig_version: String,
    pub compatibility: String,
    /// Keyed by file name; `.minisig` entries ride along with the
    /// artifacts they sign.
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactSubmission>,
}

/// One submitted file: its integrity metadata and, when the transport
/// carried them, its bytes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactSubmission {
    /// SHA-256 of the file, 64 lowercase hex characters.
    pub shasum: String,
    pub size: u64,
    #[serde(skip)]
    pub body: Option<Vec<u8>>,
}

impl ArtifactSubmission {
    /// Metadata-only submission (the canonical JSON shape).
    pub fn metadata(shasum: impl Into<String>, size: u64) -> Self {
        Self {
            shasum: shasum.into(),
            size,
            body: None,
        }
    }

    /// Submission carrying bytes; the shasum is computed here so the
    /// stored metadata always matches what gets written.
    pub fn from_bytes(body: Vec<u8>) -> Self {
        Self {
            shasum: hex::encode(Sha256::digest(&body)),
            size: body.len() as u64,
            body: Some(body),
        }
    }
}

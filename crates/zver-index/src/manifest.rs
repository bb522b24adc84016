//! Rendering release records into the wire manifest shapes.
//!
//! Two shapes share the artifact rendering: the single-release response
//! of `select-version` (with a top-level `version`) and the entries of
//! the full `index.json` (keyed by version). Artifact targets are keyed
//! `<arch>-<os>`; the `.tar.gz` variants are published for interop but
//! elided from manifests in favor of `.tar.xz`.

use std::collections::HashSet;

use chrono::DateTime;
use serde_json::{json, Map, Value};

use zver_types::{artifact_file_name, ArtifactExtension, ReleaseRecord};

use crate::error::{IndexError, IndexResult};

/// Renders records against a public URL base (no trailing slash).
#[derive(Clone, Debug)]
pub struct ManifestFormatter {
    public_url_base: String,
}

impl ManifestFormatter {
    pub fn new(public_url_base: impl Into<String>) -> Self {
        let mut public_url_base = public_url_base.into();
        while public_url_base.ends_with('/') {
            public_url_base.pop();
        }
        Self { public_url_base }
    }

    /// The single-release response body: `version`, `date`, then one
    /// entry per artifact target.
    pub fn release_manifest(&self, record: &ReleaseRecord) -> IndexResult<Map<String, Value>> {
        let mut manifest = Map::new();
        manifest.insert("version".into(), json!(record.zls_version.to_string()));
        manifest.insert("date".into(), json!(format_date(record)?));
        for (target, entry) in self.artifact_entries(record)? {
            manifest.insert(target, entry);
        }
        Ok(manifest)
    }

    /// One entry of the full index: `date`, then the artifact targets.
    pub fn index_entry(&self, record: &ReleaseRecord) -> IndexResult<Map<String, Value>> {
        let mut entry = Map::new();
        entry.insert("date".into(), json!(format_date(record)?));
        for (target, artifact) in self.artifact_entries(record)? {
            entry.insert(target, artifact);
        }
        Ok(entry)
    }

    /// The full index over tagged releases. `records` must already be in
    /// index order (newest first); key order is preserved in the output.
    pub fn full_index(&self, records: &[ReleaseRecord]) -> IndexResult<Map<String, Value>> {
        let mut index = Map::new();
        for record in records {
            index.insert(
                record.zls_version.to_string(),
                Value::Object(self.index_entry(record)?),
            );
        }
        Ok(index)
    }

    fn artifact_entries(&self, record: &ReleaseRecord) -> IndexResult<Vec<(String, Value)>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for artifact in &record.artifacts {
            if artifact.extension == ArtifactExtension::TarGz {
                continue;
            }
            let target = artifact.target();
            if !seen.insert(target.clone()) {
                return Err(IndexError::DuplicateTarget {
                    zls_version: record.zls_version.to_string(),
                    target,
                });
            }
            let file_name = artifact_file_name(
                &record.zls_version,
                &artifact.os,
                &artifact.arch,
                &artifact.version,
                artifact.extension,
            );
            entries.push((
                target,
                json!({
                    "tarball": format!("{}/{}", self.public_url_base, file_name),
                    "shasum": artifact.file_shasum,
                    "size": artifact.file_size.to_string(),
                }),
            ));
        }
        Ok(entries)
    }
}

/// UTC calendar date of the record's publish timestamp.
fn format_date(record: &ReleaseRecord) -> IndexResult<String> {
    let date = i64::try_from(record.date)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| IndexError::InvalidDate {
            zls_version: record.zls_version.to_string(),
            date: record.date,
        })?;
    Ok(date.format("%Y-%m-%d").to_string())
}

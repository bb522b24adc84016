use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::ReleaseArtifact;
use crate::compat::Compatibility;
use crate::error::TypeError;
use crate::version::Version;

/// The stored metadata for a single published ZLS version.
///
/// A record is created by the first successful publish of a ZLS version
/// and only ever grows afterwards: re-publishes with a different Zig
/// version merge a new datapoint into `tested_zig_versions` and leave
/// every other field untouched.
///
/// Unknown fields are ignored on read so the schema can grow (the
/// `minisign` flag arrived that way).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    pub zls_version: Version,
    /// The Zig version the artifacts were built with.
    pub zig_version: Version,
    pub minimum_build_zig_version: Version,
    pub minimum_runtime_zig_version: Version,
    /// Milliseconds since the UNIX epoch of the first publish.
    pub date: u64,
    /// Empty means "failed build": the version is known but produced no
    /// artifacts.
    #[serde(default)]
    pub artifacts: Vec<ReleaseArtifact>,
    /// CI datapoints, keyed by Zig version string.
    #[serde(default)]
    pub tested_zig_versions: BTreeMap<String, Compatibility>,
    /// Whether `.minisig` signature files accompany the artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minisign: Option<bool>,
}

impl ReleaseRecord {
    /// Returns `true` if this record is a tagged release.
    pub fn is_tagged(&self) -> bool {
        self.zls_version.is_tagged()
    }

    /// Parse `tested_zig_versions` into an ascending `(version,
    /// compatibility)` list. The map's semantic key is a version, so a
    /// key that fails to parse is corrupt data and surfaces as an error.
    pub fn tested_versions(&self) -> Result<Vec<(Version, Compatibility)>, TypeError> {
        let mut tested = Vec::with_capacity(self.tested_zig_versions.len());
        for (raw, compatibility) in &self.tested_zig_versions {
            let version = raw.parse::<Version>()?;
            tested.push((version, *compatibility));
        }
        tested.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(tested)
    }
}

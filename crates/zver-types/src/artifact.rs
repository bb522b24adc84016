use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::version::Version;

/// Archive format of a downloadable build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactExtension {
    #[serde(rename = "tar.xz")]
    TarXz,
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "zip")]
    Zip,
}

impl ArtifactExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TarXz => "tar.xz",
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Split a file name into its stem and extension, trying the known
    /// extensions longest-first so `tar.xz` wins over a bare `xz`.
    pub fn split_file_name(file_name: &str) -> Option<(&str, Self)> {
        for extension in [Self::TarXz, Self::TarGz, Self::Zip] {
            if let Some(stem) = file_name.strip_suffix(extension.as_str()) {
                let stem = stem.strip_suffix('.')?;
                return Some((stem, extension));
            }
        }
        None
    }
}

impl fmt::Display for ArtifactExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactExtension {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tar.xz" => Ok(Self::TarXz),
            "tar.gz" => Ok(Self::TarGz),
            "zip" => Ok(Self::Zip),
            _ => Err(TypeError::UnknownExtension(s.to_string())),
        }
    }
}

/// A downloadable compressed build for one (os, arch).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseArtifact {
    pub os: String,
    pub arch: String,
    /// ZLS version string; equal to the owning record's version.
    pub version: String,
    pub extension: ArtifactExtension,
    /// SHA-256 of the file, 64 lowercase hex characters.
    pub file_shasum: String,
    pub file_size: u64,
}

impl ReleaseArtifact {
    /// The manifest key for this artifact, always `<arch>-<os>`.
    pub fn target(&self) -> String {
        format!("{}-{}", self.arch, self.os)
    }
}

/// Returns `true` when the release uses the newer `zls-<arch>-<os>-…`
/// artifact naming. The cutover is ZLS 0.15.0; earlier releases (their
/// development builds included) use `zls-<os>-<arch>-…`.
pub fn uses_arch_os_naming(zls_version: &Version) -> bool {
    *zls_version >= Version::new(0, 15, 0)
}

/// Artifact file name as uploaded and stored, honoring the 0.15.0
/// naming cutover.
pub fn artifact_file_name(
    zls_version: &Version,
    os: &str,
    arch: &str,
    version: &str,
    extension: ArtifactExtension,
) -> String {
    if uses_arch_os_naming(zls_version) {
        format!("zls-{arch}-{os}-{version}.{extension}")
    } else {
        format!("zls-{os}-{arch}-{version}.{extension}")
    }
}

//! The ordered publish validation pipeline.
//!
//! Checks run in a fixed order, pure checks before anything touching the
//! store, and the first failure wins. The store-dependent checks (a
//! failed build must update an existing record; a development commit
//! height is first-writer-wins) live in the publisher, which owns the
//! store handle.

use std::collections::{BTreeMap, HashSet};

use zver_types::{
    uses_arch_os_naming, ArtifactExtension, Compatibility, ReleaseArtifact, Version,
};

use crate::error::{PublishError, PublishResult};
use crate::request::PublishRequest;

/// A request that passed every pure check, with domain types in place of
/// wire strings.
#[derive(Clone, Debug)]
pub struct ValidatedPublish {
    pub zls_version: Version,
    pub zig_version: Version,
    pub minimum_build_zig_version: Version,
    pub minimum_runtime_zig_version: Version,
    pub compatibility: Compatibility,
    pub artifacts: Vec<ReleaseArtifact>,
    /// Everything destined for the blob store: artifacts plus signature
    /// sidecars, in submission order.
    pub uploads: Vec<BlobUpload>,
    /// Whether minisign signatures accompany the artifact set.
    pub minisign: bool,
}

/// One pending blob write.
#[derive(Clone, Debug)]
pub struct BlobUpload {
    pub key: String,
    pub content_type: &'static str,
    pub shasum: String,
    /// `None` when the transport carried metadata only; the bytes were
    /// uploaded to the bucket out-of-band and the write is skipped.
    pub body: Option<Vec<u8>>,
}

struct ParsedArtifactName {
    os: String,
    arch: String,
    version: String,
    extension: ArtifactExtension,
}

/// Run checks 1 through 5 plus the signature rules. I/O-dependent checks
/// follow in [`Publisher::commit`](crate::Publisher::commit).
pub fn validate_request(
    request: &PublishRequest,
    force_minisign: bool,
) -> PublishResult<ValidatedPublish> {
    // 1. Scalar fields.
    let zls_version = parse_version_field("zlsVersion", &request.zls_version)?;
    let zig_version = parse_version_field("zigVersion", &request.zig_version)?;
    let minimum_build_zig_version =
        parse_version_field("minimumBuildZigVersion", &request.minimum_build_zig_version)?;
    let minimum_runtime_zig_version = parse_version_field(
        "minimumRuntimeZigVersion",
        &request.minimum_runtime_zig_version,
    )?;
    let compatibility: Compatibility = request
        .compatibility
        .parse()
        .map_err(|_| PublishError::UnknownCompatibility(request.compatibility.clone()))?;

    // 2. Artifact names and integrity metadata.
    let expected_version = zls_version.to_string();
    let mut artifacts = Vec::new();
    let mut uploads = Vec::new();
    let mut primary_names = HashSet::new();
    let mut signatures = Vec::new();

    for (file_name, submission) in &request.artifacts {
        if !is_sha256_hex(&submission.shasum) {
            return Err(PublishError::InvalidShasum {
                file: file_name.clone(),
            });
        }
        if submission.size == 0 {
            return Err(PublishError::EmptyArtifactFile {
                file: file_name.clone(),
            });
        }

        if let Some(signed_name) = file_name.strip_suffix(".minisig") {
            signatures.push((file_name.clone(), signed_name.to_string()));
            uploads.push(BlobUpload {
                key: file_name.clone(),
                content_type: "text/plain",
                shasum: submission.shasum.clone(),
                body: submission.body.clone(),
            });
            continue;
        }

        let parsed = parse_artifact_name(file_name, &zls_version)
            .ok_or_else(|| PublishError::InvalidArtifactName(file_name.clone()))?;
        if parsed.version != expected_version {
            return Err(PublishError::ArtifactVersionMismatch {
                file: file_name.clone(),
                expected: expected_version.clone(),
            });
        }

        primary_names.insert(file_name.clone());
        uploads.push(BlobUpload {
            key: file_name.clone(),
            content_type: content_type(parsed.extension),
            shasum: submission.shasum.clone(),
            body: submission.body.clone(),
        });
        artifacts.push(ReleaseArtifact {
            os: parsed.os,
            arch: parsed.arch,
            version: parsed.version,
            extension: parsed.extension,
            file_shasum: submission.shasum.clone(),
            file_size: submission.size,
        });
    }

    // 3. Extension sets per (os, arch, version) group.
    let mut groups: BTreeMap<(&str, &str, &str), Vec<ArtifactExtension>> = BTreeMap::new();
    for artifact in &artifacts {
        groups
            .entry((&artifact.os, &artifact.arch, &artifact.version))
            .or_default()
            .push(artifact.extension);
    }
    for ((os, arch, _), mut extensions) in groups {
        extensions.sort_by_key(ArtifactExtension::as_str);
        let (valid, expected) = if os == "windows" {
            (extensions == [ArtifactExtension::Zip], "zip")
        } else {
            (
                extensions == [ArtifactExtension::TarGz, ArtifactExtension::TarXz],
                "tar.xz and tar.gz",
            )
        };
        if !valid {
            return Err(PublishError::ExtensionSetMismatch {
                os: os.to_string(),
                arch: arch.to_string(),
                expected,
            });
        }
    }

    // 4. Version-shape invariants.
    if zls_version.is_tagged() {
        if !zig_version.is_tagged() {
            return Err(PublishError::TaggedWithDevelopmentZig(expected_version));
        }
        if artifacts.is_empty() {
            return Err(PublishError::TaggedWithoutArtifacts(expected_version));
        }
        if compatibility != Compatibility::Full {
            return Err(PublishError::TaggedNotFull(expected_version));
        }
    } else if zls_version.patch != 0 {
        // Development builds order by commit height; a patch bump would
        // reset that order.
        return Err(PublishError::DevPatchNonZero(expected_version));
    }
    if zls_version.major != 0 {
        return Err(PublishError::UnsupportedRelease(expected_version));
    }

    // 5. An empty artifact set and a `none` verdict imply each other.
    if artifacts.is_empty() && compatibility != Compatibility::None {
        return Err(PublishError::MissingArtifacts(
            compatibility.as_str().to_string(),
        ));
    }
    if !artifacts.is_empty() && compatibility == Compatibility::None {
        return Err(PublishError::NoneWithArtifacts);
    }

    // Signatures: each sidecar pairs a submitted artifact, and coverage
    // is all-or-nothing.
    for (signature_name, signed_name) in &signatures {
        if !primary_names.contains(signed_name) {
            return Err(PublishError::UnpairedSignature(signature_name.clone()));
        }
    }
    let minisign = !signatures.is_empty();
    if minisign && signatures.len() != artifacts.len() {
        return Err(PublishError::InconsistentSignatures);
    }
    if force_minisign && !minisign && !artifacts.is_empty() {
        return Err(PublishError::SignaturesRequired);
    }

    Ok(ValidatedPublish {
        zls_version,
        zig_version,
        minimum_build_zig_version,
        minimum_runtime_zig_version,
        compatibility,
        artifacts,
        uploads,
        minisign,
    })
}

fn parse_version_field(field: &'static str, value: &str) -> PublishResult<Version> {
    Version::parse(value).ok_or_else(|| PublishError::UnparsableVersion {
        field,
        value: value.to_string(),
    })
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn content_type(extension: ArtifactExtension) -> &'static str {
    match extension {
        ArtifactExtension::TarXz => "application/x-xz",
        ArtifactExtension::TarGz => "application/gzip",
        ArtifactExtension::Zip => "application/zip",
    }
}

/// Parse `zls-<os>-<arch>-<version>.<ext>` (or the arch-os order from
/// 0.15.0 on). The version portion may itself contain dashes, so only
/// the first two are separators.
fn parse_artifact_name(file_name: &str, zls_version: &Version) -> Option<ParsedArtifactName> {
    let (stem, extension) = ArtifactExtension::split_file_name(file_name)?;
    let rest = stem.strip_prefix("zls-")?;
    let (first, rest) = rest.split_once('-')?;
    let (second, version) = rest.split_once('-')?;
    if first.is_empty() || second.is_empty() || version.is_empty() {
        return None;
    }
    let (os, arch) = if uses_arch_os_naming(zls_version) {
        (second, first)
    } else {
        (first, second)
    };
    Some(ParsedArtifactName {
        os: os.to_string(),
        arch: arch.to_string(),
        version: version.to_string(),
        extension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ArtifactSubmission;

    fn shasum(seed: u8) -> String {
        format!("{:02x}", seed).repeat(32)
    }

    fn linux_pair(version: &str) -> Vec<(String, ArtifactSubmission)> {
        vec![
            (
                format!("zls-linux-x86_64-{version}.tar.xz"),
                ArtifactSubmission::metadata(shasum(1), 100),
            ),
            (
                format!("zls-linux-x86_64-{version}.tar.gz"),
                ArtifactSubmission::metadata(shasum(2), 120),
            ),
        ]
    }

    fn request(zls: &str, zig: &str, compatibility: &str) -> PublishRequest {
        PublishRequest {
            zls_version: zls.to_string(),
            zig_version: zig.to_string(),
            minimum_build_zig_version: zig.to_string(),
            minimum_runtime_zig_version: zig.to_string(),
            compatibility: compatibility.to_string(),
            artifacts: linux_pair(zls).into_iter().collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Scalar checks
    // -----------------------------------------------------------------------

    #[test]
    fn accepts_a_well_formed_request() {
        let validated = validate_request(&request("0.12.0", "0.12.0", "full"), false).unwrap();
        assert_eq!(validated.zls_version.to_string(), "0.12.0");
        assert_eq!(validated.compatibility, Compatibility::Full);
        assert_eq!(validated.artifacts.len(), 2);
        assert_eq!(validated.uploads.len(), 2);
        assert!(!validated.minisign);
    }

    #[test]
    fn bad_version_field_names_the_field() {
        let mut req = request("0.12.0", "0.12.0", "full");
        req.minimum_runtime_zig_version = "latest".to_string();
        let err = validate_request(&req, false).unwrap_err();
        assert!(err.to_string().contains("minimumRuntimeZigVersion"));
    }

    #[test]
    fn bad_compatibility_is_rejected() {
        let err = validate_request(&request("0.12.0", "0.12.0", "sometimes"), false).unwrap_err();
        assert!(matches!(err, PublishError::UnknownCompatibility(_)));
    }

    // -----------------------------------------------------------------------
    // Artifact checks
    // -----------------------------------------------------------------------

    #[test]
    fn bad_artifact_name_is_rejected() {
        let mut req = request("0.12.0", "0.12.0", "full");
        req.artifacts.insert(
            "zlsx-linux-0.12.0.tar.xz".to_string(),
            ArtifactSubmission::metadata(shasum(9), 10),
        );
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::InvalidArtifactName(_)));
    }

    #[test]
    fn artifact_version_must_match_zls_version() {
        let mut req = request("0.12.0", "0.12.0", "full");
        req.artifacts.insert(
            "zls-linux-aarch64-0.12.1.tar.xz".to_string(),
            ArtifactSubmission::metadata(shasum(9), 10),
        );
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::ArtifactVersionMismatch { .. }));
    }

    #[test]
    fn shasum_shape_is_enforced() {
        let mut req = request("0.12.0", "0.12.0", "full");
        let uppercase = "AB".repeat(32);
        let non_hex = "zz".repeat(32);
        for bad in ["deadbeef", uppercase.as_str(), non_hex.as_str()] {
            req.artifacts.insert(
                "zls-linux-aarch64-0.12.0.tar.xz".to_string(),
                ArtifactSubmission::metadata(bad.to_string(), 10),
            );
            let err = validate_request(&req, false).unwrap_err();
            assert!(matches!(err, PublishError::InvalidShasum { .. }), "{bad}");
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut req = request("0.12.0", "0.12.0", "full");
        req.artifacts.insert(
            "zls-linux-x86_64-0.12.0.tar.xz".to_string(),
            ArtifactSubmission::metadata(shasum(1), 0),
        );
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::EmptyArtifactFile { .. }));
    }

    #[test]
    fn dev_version_in_artifact_names_parses() {
        let zls = "0.13.0-dev.5+abcdef0";
        let mut req = request(zls, "0.13.0-dev.20+1234567", "full");
        req.artifacts = linux_pair(zls).into_iter().collect();
        let validated = validate_request(&req, false).unwrap();
        assert_eq!(validated.artifacts[0].version, zls);
    }

    #[test]
    fn arch_os_order_applies_from_0_15_0() {
        let mut req = request("0.15.0", "0.15.0", "full");
        req.artifacts = vec![
            (
                "zls-x86_64-linux-0.15.0.tar.xz".to_string(),
                ArtifactSubmission::metadata(shasum(1), 10),
            ),
            (
                "zls-x86_64-linux-0.15.0.tar.gz".to_string(),
                ArtifactSubmission::metadata(shasum(2), 10),
            ),
        ]
        .into_iter()
        .collect();
        let validated = validate_request(&req, false).unwrap();
        assert_eq!(validated.artifacts[0].os, "linux");
        assert_eq!(validated.artifacts[0].arch, "x86_64");
    }

    // -----------------------------------------------------------------------
    // Extension sets
    // -----------------------------------------------------------------------

    #[test]
    fn missing_tar_gz_fails_the_group() {
        // E10
        let mut req = request("0.1.0", "0.1.0", "full");
        req.artifacts = vec![(
            "zls-linux-x86_64-0.1.0.tar.xz".to_string(),
            ArtifactSubmission::metadata(shasum(1), 10),
        )]
        .into_iter()
        .collect();
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::ExtensionSetMismatch { .. }));
        assert!(err.to_string().contains("tar.xz and tar.gz"));
    }

    #[test]
    fn windows_takes_exactly_zip() {
        let mut req = request("0.1.0", "0.1.0", "full");
        req.artifacts.insert(
            "zls-windows-x86_64-0.1.0.zip".to_string(),
            ArtifactSubmission::metadata(shasum(3), 10),
        );
        validate_request(&req, false).unwrap();

        req.artifacts.insert(
            "zls-windows-x86_64-0.1.0.tar.xz".to_string(),
            ArtifactSubmission::metadata(shasum(4), 10),
        );
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::ExtensionSetMismatch { .. }));
    }

    // -----------------------------------------------------------------------
    // Version-shape invariants
    // -----------------------------------------------------------------------

    #[test]
    fn tagged_release_requires_tagged_zig() {
        let err =
            validate_request(&request("0.12.0", "0.12.0-dev.5+abcdef0", "full"), false).unwrap_err();
        assert!(matches!(err, PublishError::TaggedWithDevelopmentZig(_)));
    }

    #[test]
    fn tagged_release_requires_artifacts() {
        let mut req = request("0.12.0", "0.12.0", "full");
        req.artifacts.clear();
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::TaggedWithoutArtifacts(_)));
    }

    #[test]
    fn tagged_release_requires_full_compatibility() {
        let err = validate_request(&request("0.12.0", "0.12.0", "only-runtime"), false).unwrap_err();
        assert!(matches!(err, PublishError::TaggedNotFull(_)));
    }

    #[test]
    fn dev_build_patch_must_be_zero() {
        let zls = "0.12.1-dev.3+abcdef0";
        let mut req = request(zls, "0.12.0", "full");
        req.artifacts = linux_pair(zls).into_iter().collect();
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::DevPatchNonZero(_)));
    }

    #[test]
    fn major_one_gets_the_teapot() {
        // E12 (validation half; the HTTP status mapping is tested with
        // the error type).
        let zls = "1.0.0";
        let mut req = request(zls, "1.0.0", "full");
        req.artifacts = linux_pair(zls).into_iter().collect();
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::UnsupportedRelease(_)));
        assert_eq!(err.http_status(), 418);
    }

    // -----------------------------------------------------------------------
    // Empty-set / compatibility coupling
    // -----------------------------------------------------------------------

    #[test]
    fn empty_artifacts_require_none() {
        let zls = "0.12.0-dev.3+abcdef0";
        let mut req = request(zls, "0.12.0-dev.20+1234567", "full");
        req.artifacts.clear();
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::MissingArtifacts(_)));
    }

    #[test]
    fn none_forbids_artifacts() {
        let zls = "0.12.0-dev.3+abcdef0";
        let mut req = request(zls, "0.12.0-dev.20+1234567", "none");
        req.artifacts = linux_pair(zls).into_iter().collect();
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::NoneWithArtifacts));
    }

    #[test]
    fn failed_build_shape_passes_pure_validation() {
        let mut req = request("0.12.0-dev.3+abcdef0", "0.12.0-dev.20+1234567", "none");
        req.artifacts.clear();
        let validated = validate_request(&req, false).unwrap();
        assert!(validated.artifacts.is_empty());
        assert_eq!(validated.compatibility, Compatibility::None);
    }

    // -----------------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------------

    fn signed_request() -> PublishRequest {
        let mut req = request("0.12.0", "0.12.0", "full");
        for name in [
            "zls-linux-x86_64-0.12.0.tar.xz.minisig",
            "zls-linux-x86_64-0.12.0.tar.gz.minisig",
        ] {
            req.artifacts
                .insert(name.to_string(), ArtifactSubmission::metadata(shasum(7), 1));
        }
        req
    }

    #[test]
    fn full_signature_coverage_is_accepted() {
        let validated = validate_request(&signed_request(), true).unwrap();
        assert!(validated.minisign);
        assert_eq!(validated.artifacts.len(), 2);
        assert_eq!(validated.uploads.len(), 4);
    }

    #[test]
    fn partial_signature_coverage_is_rejected() {
        let mut req = signed_request();
        req.artifacts
            .remove("zls-linux-x86_64-0.12.0.tar.gz.minisig");
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::InconsistentSignatures));
    }

    #[test]
    fn orphan_signature_is_rejected() {
        let mut req = request("0.12.0", "0.12.0", "full");
        req.artifacts.insert(
            "zls-macos-aarch64-0.12.0.tar.xz.minisig".to_string(),
            ArtifactSubmission::metadata(shasum(7), 1),
        );
        let err = validate_request(&req, false).unwrap_err();
        assert!(matches!(err, PublishError::UnpairedSignature(_)));
    }

    #[test]
    fn force_minisign_rejects_unsigned_publishes() {
        let err = validate_request(&request("0.12.0", "0.12.0", "full"), true).unwrap_err();
        assert!(matches!(err, PublishError::SignaturesRequired));

        // Failed-build updates carry no artifacts and stay exempt.
        let mut req = request("0.12.0-dev.3+abcdef0", "0.12.0-dev.20+1234567", "none");
        req.artifacts.clear();
        validate_request(&req, true).unwrap();
    }
}

//! The "enclosed in failure" check over a record's tested Zig versions.

use zver_types::Version;

/// One CI datapoint, collapsed to pass/fail under the requested
/// compatibility regime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestedVersion {
    pub version: Version,
    pub success: bool,
}

/// Returns `true` if `zig_version` sits in a failed region of `tested`.
///
/// `tested` must be sorted ascending by version. A version is enclosed
/// when both of its nearest tested neighbors failed; a tested version
/// equal to `zig_version` counts as both neighbors. Outside the tested
/// range only the nearest endpoint matters. An empty slice encloses
/// nothing.
pub fn is_enclosed_in_failure(tested: &[TestedVersion], zig_version: &Version) -> bool {
    let (Some(first), Some(last)) = (tested.first(), tested.last()) else {
        return false;
    };

    if *zig_version <= first.version {
        return !first.success;
    }
    if *zig_version >= last.version {
        return !last.success;
    }

    // Strictly inside the tested range, so the insertion point has a
    // neighbor on both sides.
    match tested.binary_search_by(|t| t.version.cmp(zig_version)) {
        Ok(exact) => !tested[exact].success,
        Err(gap) => !tested[gap - 1].success && !tested[gap].success,
    }
}

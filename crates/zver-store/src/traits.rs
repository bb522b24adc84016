use zver_types::{Compatibility, ReleaseRecord, Version};

use crate::error::StoreResult;

/// Persistent mapping from a ZLS version to its release record.
///
/// All implementations must satisfy these invariants:
/// - Records are keyed by the exact formatted version string, so two
///   development builds differing only in commit id occupy distinct
///   keys even though they compare equal.
/// - Every query returns records in the order its documentation states;
///   callers (the version selector in particular) rely on it.
/// - [`publish_batch`](ReleaseStore::publish_batch) is atomic: a newly
///   created record is never observable without the tested-version
///   datapoint that created it.
pub trait ReleaseStore: Send + Sync {
    /// Exact-match lookup by ZLS version.
    ///
    /// Returns `Ok(None)` if no record exists.
    fn get(&self, zls_version: &Version) -> StoreResult<Option<ReleaseRecord>>;

    /// All tagged releases, `(major, minor, patch)` descending.
    fn all_tagged_desc(&self) -> StoreResult<Vec<ReleaseRecord>>;

    /// All tagged releases, `(major, minor, patch)` ascending.
    fn all_tagged_asc(&self) -> StoreResult<Vec<ReleaseRecord>>;

    /// Tagged releases of one `(major, minor)` cycle, patch descending.
    fn tagged_by_minor(&self, major: u64, minor: u64) -> StoreResult<Vec<ReleaseRecord>>;

    /// Development builds of one `(major, minor)` cycle, commit height
    /// ascending.
    fn dev_by_minor(&self, major: u64, minor: u64) -> StoreResult<Vec<ReleaseRecord>>;

    /// The development build at an exact `(major, minor, patch,
    /// commit_height)` quad, if any. At most one row exists.
    fn dev_by_quad(
        &self,
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
    ) -> StoreResult<Option<ReleaseRecord>>;

    /// Insert a record if its version is absent. Returns `true` if the
    /// record was inserted; an existing row is left untouched.
    fn upsert(&self, record: &ReleaseRecord) -> StoreResult<bool>;

    /// Merge one datapoint into a record's `tested_zig_versions`,
    /// overwriting any previous verdict for the same Zig version.
    fn patch_tested(
        &self,
        zls_version: &Version,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> StoreResult<()>;

    /// [`upsert`](ReleaseStore::upsert) followed by
    /// [`patch_tested`](ReleaseStore::patch_tested), applied atomically.
    fn publish_batch(
        &self,
        record: &ReleaseRecord,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> StoreResult<()>;
}

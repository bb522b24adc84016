//! In-memory release store for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use zver_types::{Compatibility, ReleaseRecord, Version};

use crate::error::{StoreError, StoreResult};
use crate::traits::ReleaseStore;

/// An in-memory implementation of [`ReleaseStore`].
///
/// Records live in a `HashMap` keyed by the formatted version string,
/// behind a `RwLock`. Queries filter and sort on the fly; the ordering
/// contract matters here, not speed. Data is lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryReleaseStore {
    records: RwLock<HashMap<String, ReleaseRecord>>,
}

impl InMemoryReleaseStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect<F>(&self, filter: F) -> StoreResult<Vec<ReleaseRecord>>
    where
        F: Fn(&ReleaseRecord) -> bool,
    {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.values().filter(|r| filter(r)).cloned().collect())
    }
}

impl ReleaseStore for InMemoryReleaseStore {
    fn get(&self, zls_version: &Version) -> StoreResult<Option<ReleaseRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(&zls_version.to_string()).cloned())
    }

    fn all_tagged_desc(&self) -> StoreResult<Vec<ReleaseRecord>> {
        let mut tagged = self.collect(ReleaseRecord::is_tagged)?;
        tagged.sort_by(|a, b| b.zls_version.cmp(&a.zls_version));
        Ok(tagged)
    }

    fn all_tagged_asc(&self) -> StoreResult<Vec<ReleaseRecord>> {
        let mut tagged = self.collect(ReleaseRecord::is_tagged)?;
        tagged.sort_by(|a, b| a.zls_version.cmp(&b.zls_version));
        Ok(tagged)
    }

    fn tagged_by_minor(&self, major: u64, minor: u64) -> StoreResult<Vec<ReleaseRecord>> {
        let mut tagged = self.collect(|r| {
            r.is_tagged() && r.zls_version.major == major && r.zls_version.minor == minor
        })?;
        tagged.sort_by(|a, b| b.zls_version.patch.cmp(&a.zls_version.patch));
        Ok(tagged)
    }

    fn dev_by_minor(&self, major: u64, minor: u64) -> StoreResult<Vec<ReleaseRecord>> {
        let mut dev = self.collect(|r| {
            !r.is_tagged() && r.zls_version.major == major && r.zls_version.minor == minor
        })?;
        dev.sort_by(|a, b| a.zls_version.cmp(&b.zls_version));
        Ok(dev)
    }

    fn dev_by_quad(
        &self,
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
    ) -> StoreResult<Option<ReleaseRecord>> {
        let matches = self.collect(|r| {
            let v = &r.zls_version;
            v.major == major
                && v.minor == minor
                && v.patch == patch
                && v.dev.as_ref().is_some_and(|d| d.commit_height == commit_height)
        })?;
        Ok(matches.into_iter().next())
    }

    fn upsert(&self, record: &ReleaseRecord) -> StoreResult<bool> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let key = record.zls_version.to_string();
        if records.contains_key(&key) {
            return Ok(false);
        }
        records.insert(key, record.clone());
        Ok(true)
    }

    fn patch_tested(
        &self,
        zls_version: &Version,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let record = records
            .get_mut(&zls_version.to_string())
            .ok_or_else(|| StoreError::NotFound(zls_version.to_string()))?;
        record
            .tested_zig_versions
            .insert(zig_version.to_string(), compatibility);
        Ok(())
    }

    fn publish_batch(
        &self,
        record: &ReleaseRecord,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> StoreResult<()> {
        // One write lock spans both steps, so readers never observe the
        // record without its creating datapoint.
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let key = record.zls_version.to_string();
        let entry = records.entry(key).or_insert_with(|| record.clone());
        entry
            .tested_zig_versions
            .insert(zig_version.to_string(), compatibility);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(zls: &str, zig: &str) -> ReleaseRecord {
        ReleaseRecord {
            zls_version: zls.parse().unwrap(),
            zig_version: zig.parse().unwrap(),
            minimum_build_zig_version: zig.parse().unwrap(),
            minimum_runtime_zig_version: zig.parse().unwrap(),
            date: 1_700_000_000_000,
            artifacts: Vec::new(),
            tested_zig_versions: BTreeMap::new(),
            minisign: None,
        }
    }

    fn seeded() -> InMemoryReleaseStore {
        let store = InMemoryReleaseStore::new();
        for (zls, zig) in [
            ("0.11.0", "0.11.0"),
            ("0.12.0", "0.12.0"),
            ("0.12.1", "0.12.0"),
            ("0.13.0", "0.13.0"),
            ("0.12.0-dev.1+aaaaaaa", "0.11.0"),
            ("0.12.0-dev.3+ccccccc", "0.12.0-dev.17+fffffff"),
            ("0.12.0-dev.2+bbbbbbb", "0.12.0-dev.7+eeeeeee"),
        ] {
            store.upsert(&record(zls, zig)).unwrap();
        }
        store
    }

    fn versions(records: &[ReleaseRecord]) -> Vec<String> {
        records.iter().map(|r| r.zls_version.to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // Ordered queries
    // -----------------------------------------------------------------------

    #[test]
    fn all_tagged_desc_order() {
        let store = seeded();
        assert_eq!(
            versions(&store.all_tagged_desc().unwrap()),
            ["0.13.0", "0.12.1", "0.12.0", "0.11.0"]
        );
    }

    #[test]
    fn all_tagged_asc_order() {
        let store = seeded();
        assert_eq!(
            versions(&store.all_tagged_asc().unwrap()),
            ["0.11.0", "0.12.0", "0.12.1", "0.13.0"]
        );
    }

    #[test]
    fn tagged_by_minor_patch_desc() {
        let store = seeded();
        assert_eq!(
            versions(&store.tagged_by_minor(0, 12).unwrap()),
            ["0.12.1", "0.12.0"]
        );
        assert!(store.tagged_by_minor(0, 15).unwrap().is_empty());
    }

    #[test]
    fn dev_by_minor_height_asc() {
        let store = seeded();
        assert_eq!(
            versions(&store.dev_by_minor(0, 12).unwrap()),
            [
                "0.12.0-dev.1+aaaaaaa",
                "0.12.0-dev.2+bbbbbbb",
                "0.12.0-dev.3+ccccccc"
            ]
        );
    }

    #[test]
    fn dev_by_minor_excludes_tagged() {
        let store = seeded();
        assert!(store.dev_by_minor(0, 11).unwrap().is_empty());
    }

    #[test]
    fn dev_by_quad_exact() {
        let store = seeded();
        let hit = store.dev_by_quad(0, 12, 0, 2).unwrap().unwrap();
        assert_eq!(hit.zls_version.to_string(), "0.12.0-dev.2+bbbbbbb");
        assert!(store.dev_by_quad(0, 12, 0, 99).unwrap().is_none());
        assert!(store.dev_by_quad(0, 12, 1, 2).unwrap().is_none());
    }

    #[test]
    fn get_is_exact_on_the_formatted_string() {
        let store = seeded();
        let same_quad: Version = "0.12.0-dev.2+ddddddd".parse().unwrap();
        // Equal under version ordering, but a different stored key.
        assert!(store.get(&same_quad).unwrap().is_none());
        let exact: Version = "0.12.0-dev.2+bbbbbbb".parse().unwrap();
        assert!(store.get(&exact).unwrap().is_some());
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    #[test]
    fn upsert_is_insert_if_absent() {
        let store = InMemoryReleaseStore::new();
        let mut rec = record("0.11.0", "0.11.0");
        assert!(store.upsert(&rec).unwrap());

        rec.date = 42;
        assert!(!store.upsert(&rec).unwrap());
        let stored = store.get(&"0.11.0".parse().unwrap()).unwrap().unwrap();
        assert_eq!(stored.date, 1_700_000_000_000);
    }

    #[test]
    fn patch_tested_merges_and_overwrites() {
        let store = seeded();
        let zls: Version = "0.11.0".parse().unwrap();
        store
            .patch_tested(&zls, "0.11.0", Compatibility::Full)
            .unwrap();
        store
            .patch_tested(&zls, "0.12.0", Compatibility::None)
            .unwrap();
        store
            .patch_tested(&zls, "0.12.0", Compatibility::OnlyRuntime)
            .unwrap();

        let stored = store.get(&zls).unwrap().unwrap();
        assert_eq!(
            stored.tested_zig_versions.get("0.12.0"),
            Some(&Compatibility::OnlyRuntime)
        );
        assert_eq!(stored.tested_zig_versions.len(), 2);
    }

    #[test]
    fn patch_tested_unknown_version_fails() {
        let store = InMemoryReleaseStore::new();
        let err = store
            .patch_tested(&"0.1.0".parse().unwrap(), "0.1.0", Compatibility::Full)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn publish_batch_lands_record_with_datapoint() {
        let store = InMemoryReleaseStore::new();
        let rec = record("0.12.0", "0.12.0");
        store
            .publish_batch(&rec, "0.12.0", Compatibility::Full)
            .unwrap();

        let stored = store.get(&rec.zls_version).unwrap().unwrap();
        assert_eq!(
            stored.tested_zig_versions.get("0.12.0"),
            Some(&Compatibility::Full)
        );
    }

    #[test]
    fn publish_batch_on_existing_record_only_patches() {
        let store = InMemoryReleaseStore::new();
        let rec = record("0.12.0", "0.12.0");
        store
            .publish_batch(&rec, "0.12.0", Compatibility::Full)
            .unwrap();

        let mut again = rec.clone();
        again.date = 7;
        store
            .publish_batch(&again, "0.12.1", Compatibility::OnlyRuntime)
            .unwrap();

        let stored = store.get(&rec.zls_version).unwrap().unwrap();
        assert_eq!(stored.date, rec.date);
        assert_eq!(stored.tested_zig_versions.len(), 2);
    }
}

//! SQLite-backed release store.
//!
//! One table holds every record, with the version components denormalized
//! into indexed columns so each ordered query is a single index scan:
//!
//! - `(is_release, major, minor, patch)` serves the tagged queries
//! - `(major, minor, build_id) WHERE is_release = 0` serves the
//!   development queries
//!
//! The record itself is stored as JSON in `json_data`; the columns exist
//! for filtering and ordering only.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use zver_types::{Compatibility, ReleaseRecord, Version};

use crate::error::{StoreError, StoreResult};
use crate::traits::ReleaseStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS zls_releases (
    zls_version TEXT PRIMARY KEY,
    major       INTEGER NOT NULL,
    minor       INTEGER NOT NULL,
    patch       INTEGER NOT NULL,
    is_release  INTEGER NOT NULL,
    build_id    INTEGER,
    json_data   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS zls_releases_tagged_idx
    ON zls_releases (is_release, major, minor, patch);
CREATE INDEX IF NOT EXISTS zls_releases_dev_idx
    ON zls_releases (major, minor, build_id) WHERE is_release = 0;
";

/// A [`ReleaseStore`] persisted in a SQLite database.
pub struct SqliteReleaseStore {
    conn: Mutex<Connection>,
}

impl SqliteReleaseStore {
    /// Open (and initialize if necessary) a database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        // WAL keeps readers from blocking the publish transaction.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    /// Open a fresh in-memory database (for tests).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn query_records(&self, sql: &str, bind: &[&dyn rusqlite::ToSql]) -> StoreResult<Vec<ReleaseRecord>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(bind, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (version, json) = row?;
            records.push(decode_record(&version, &json)?);
        }
        Ok(records)
    }
}

fn decode_record(version: &str, json: &str) -> StoreResult<ReleaseRecord> {
    serde_json::from_str(json).map_err(|err| StoreError::CorruptRecord {
        version: version.to_string(),
        reason: err.to_string(),
    })
}

fn encode_record(record: &ReleaseRecord) -> StoreResult<String> {
    serde_json::to_string(record).map_err(|err| StoreError::CorruptRecord {
        version: record.zls_version.to_string(),
        reason: err.to_string(),
    })
}

fn insert_if_absent(conn: &Connection, record: &ReleaseRecord) -> StoreResult<bool> {
    let version = &record.zls_version;
    let build_id = version.dev.as_ref().map(|dev| dev.commit_height);
    let changed = conn.execute(
        "INSERT OR IGNORE INTO zls_releases
             (zls_version, major, minor, patch, is_release, build_id, json_data)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            version.to_string(),
            version.major,
            version.minor,
            version.patch,
            version.is_tagged(),
            build_id,
            encode_record(record)?,
        ],
    )?;
    Ok(changed > 0)
}

fn merge_tested(
    conn: &Connection,
    zls_version: &Version,
    zig_version: &str,
    compatibility: Compatibility,
) -> StoreResult<()> {
    let key = zls_version.to_string();
    let json: Option<String> = conn
        .query_row(
            "SELECT json_data FROM zls_releases WHERE zls_version = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    let json = json.ok_or_else(|| StoreError::NotFound(key.clone()))?;

    let mut record = decode_record(&key, &json)?;
    record
        .tested_zig_versions
        .insert(zig_version.to_string(), compatibility);

    conn.execute(
        "UPDATE zls_releases SET json_data = ?2 WHERE zls_version = ?1",
        params![key, encode_record(&record)?],
    )?;
    Ok(())
}

impl ReleaseStore for SqliteReleaseStore {
    fn get(&self, zls_version: &Version) -> StoreResult<Option<ReleaseRecord>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let key = zls_version.to_string();
        let json: Option<String> = conn
            .query_row(
                "SELECT json_data FROM zls_releases WHERE zls_version = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|json| decode_record(&key, &json)).transpose()
    }

    fn all_tagged_desc(&self) -> StoreResult<Vec<ReleaseRecord>> {
        self.query_records(
            "SELECT zls_version, json_data FROM zls_releases
             WHERE is_release = 1
             ORDER BY major DESC, minor DESC, patch DESC",
            &[],
        )
    }

    fn all_tagged_asc(&self) -> StoreResult<Vec<ReleaseRecord>> {
        self.query_records(
            "SELECT zls_version, json_data FROM zls_releases
             WHERE is_release = 1
             ORDER BY major ASC, minor ASC, patch ASC",
            &[],
        )
    }

    fn tagged_by_minor(&self, major: u64, minor: u64) -> StoreResult<Vec<ReleaseRecord>> {
        self.query_records(
            "SELECT zls_version, json_data FROM zls_releases
             WHERE is_release = 1 AND major = ?1 AND minor = ?2
             ORDER BY patch DESC",
            &[&major, &minor],
        )
    }

    fn dev_by_minor(&self, major: u64, minor: u64) -> StoreResult<Vec<ReleaseRecord>> {
        self.query_records(
            "SELECT zls_version, json_data FROM zls_releases
             WHERE is_release = 0 AND major = ?1 AND minor = ?2
             ORDER BY build_id ASC",
            &[&major, &minor],
        )
    }

    fn dev_by_quad(
        &self,
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
    ) -> StoreResult<Option<ReleaseRecord>> {
        let records = self.query_records(
            "SELECT zls_version, json_data FROM zls_releases
             WHERE is_release = 0 AND major = ?1 AND minor = ?2
                   AND build_id = ?3 AND patch = ?4",
            &[&major, &minor, &commit_height, &patch],
        )?;
        Ok(records.into_iter().next())
    }

    fn upsert(&self, record: &ReleaseRecord) -> StoreResult<bool> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        insert_if_absent(&conn, record)
    }

    fn patch_tested(
        &self,
        zls_version: &Version,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction()?;
        merge_tested(&tx, zls_version, zig_version, compatibility)?;
        tx.commit()?;
        Ok(())
    }

    fn publish_batch(
        &self,
        record: &ReleaseRecord,
        zig_version: &str,
        compatibility: Compatibility,
    ) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction()?;
        insert_if_absent(&tx, record)?;
        merge_tested(&tx, &record.zls_version, zig_version, compatibility)?;
        tx.commit()?;
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

    fn seeded() -> SqliteReleaseStore {
        let store = SqliteReleaseStore::open_in_memory().unwrap();
        for (zls, zig) in [
            ("0.11.0", "0.11.0"),
            ("0.12.1", "0.12.0"),
            ("0.12.0", "0.12.0"),
            ("0.13.0", "0.13.0"),
            ("0.12.0-dev.3+ccccccc", "0.12.0-dev.17+fffffff"),
            ("0.12.0-dev.1+aaaaaaa", "0.11.0"),
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
    // Query results and ordering
    // -----------------------------------------------------------------------

    #[test]
    fn tagged_queries_order() {
        let store = seeded();
        assert_eq!(
            versions(&store.all_tagged_desc().unwrap()),
            ["0.13.0", "0.12.1", "0.12.0", "0.11.0"]
        );
        assert_eq!(
            versions(&store.all_tagged_asc().unwrap()),
            ["0.11.0", "0.12.0", "0.12.1", "0.13.0"]
        );
        assert_eq!(
            versions(&store.tagged_by_minor(0, 12).unwrap()),
            ["0.12.1", "0.12.0"]
        );
    }

    #[test]
    fn dev_queries() {
        let store = seeded();
        assert_eq!(
            versions(&store.dev_by_minor(0, 12).unwrap()),
            [
                "0.12.0-dev.1+aaaaaaa",
                "0.12.0-dev.2+bbbbbbb",
                "0.12.0-dev.3+ccccccc"
            ]
        );
        let hit = store.dev_by_quad(0, 12, 0, 2).unwrap().unwrap();
        assert_eq!(hit.zls_version.to_string(), "0.12.0-dev.2+bbbbbbb");
        assert!(store.dev_by_quad(0, 12, 0, 42).unwrap().is_none());
    }

    #[test]
    fn get_roundtrips_record_json() {
        let store = SqliteReleaseStore::open_in_memory().unwrap();
        let mut rec = record("0.12.0", "0.12.0");
        rec.tested_zig_versions
            .insert("0.12.0".into(), Compatibility::Full);
        rec.minisign = Some(true);
        store.upsert(&rec).unwrap();

        let stored = store.get(&rec.zls_version).unwrap().unwrap();
        assert_eq!(stored, rec);
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    #[test]
    fn upsert_ignores_existing_row() {
        let store = SqliteReleaseStore::open_in_memory().unwrap();
        let mut rec = record("0.12.0", "0.12.0");
        assert!(store.upsert(&rec).unwrap());
        rec.date = 1;
        assert!(!store.upsert(&rec).unwrap());
        assert_eq!(
            store.get(&rec.zls_version).unwrap().unwrap().date,
            1_700_000_000_000
        );
    }

    #[test]
    fn publish_batch_is_atomic_per_record() {
        let store = SqliteReleaseStore::open_in_memory().unwrap();
        let rec = record("0.12.0-dev.5+abcdef0", "0.12.0-dev.20+1234567");
        store
            .publish_batch(&rec, "0.12.0-dev.20+1234567", Compatibility::Full)
            .unwrap();

        let stored = store.get(&rec.zls_version).unwrap().unwrap();
        assert_eq!(
            stored.tested_zig_versions.get("0.12.0-dev.20+1234567"),
            Some(&Compatibility::Full)
        );
    }

    #[test]
    fn patch_tested_unknown_version_fails() {
        let store = SqliteReleaseStore::open_in_memory().unwrap();
        let err = store
            .patch_tested(&"0.1.0".parse().unwrap(), "0.1.0", Compatibility::Full)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    // -----------------------------------------------------------------------
    // Query plans: every ordered query must hit its covering index
    // -----------------------------------------------------------------------

    fn plan(store: &SqliteReleaseStore, sql: &str) -> String {
        let conn = store.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {sql}")).unwrap();
        let details = stmt
            .query_map([], |row| row.get::<_, String>(3))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        details.join("\n")
    }

    #[test]
    fn tagged_queries_use_the_tagged_index() {
        let store = seeded();
        for sql in [
            "SELECT json_data FROM zls_releases WHERE is_release = 1
             ORDER BY major DESC, minor DESC, patch DESC",
            "SELECT json_data FROM zls_releases WHERE is_release = 1
             ORDER BY major ASC, minor ASC, patch ASC",
            "SELECT json_data FROM zls_releases
             WHERE is_release = 1 AND major = 0 AND minor = 12
             ORDER BY patch DESC",
        ] {
            let plan = plan(&store, sql);
            assert!(
                plan.contains("zls_releases_tagged_idx"),
                "expected tagged index in plan:\n{plan}"
            );
        }
    }

    #[test]
    fn dev_queries_use_the_partial_dev_index() {
        let store = seeded();
        for sql in [
            "SELECT json_data FROM zls_releases
             WHERE is_release = 0 AND major = 0 AND minor = 12
             ORDER BY build_id ASC",
            "SELECT json_data FROM zls_releases
             WHERE is_release = 0 AND major = 0 AND minor = 12
                   AND build_id = 2 AND patch = 0",
        ] {
            let plan = plan(&store, sql);
            assert!(
                plan.contains("zls_releases_dev_idx"),
                "expected dev index in plan:\n{plan}"
            );
        }
    }
}

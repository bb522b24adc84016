//! The write path: commit a validated publish to the store and hand back
//! the post-commit work.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use zver_blob::{BlobStore, PutOptions};
use zver_index::{materialize_index, ManifestFormatter};
use zver_store::ReleaseStore;
use zver_types::ReleaseRecord;

use crate::error::{PublishError, PublishResult};
use crate::request::PublishRequest;
use crate::validate::{validate_request, BlobUpload};

/// Artifacts are immutable once published.
const ARTIFACT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Accepts publish requests and mutates the release store atomically.
///
/// A request is either rejected with a typed [`PublishError`] or
/// committed in full: the pure checks run first, then the store batch,
/// and everything slower than the store (blob writes, the index
/// snapshot) is returned as [`DeferredWork`] so the response does not
/// wait on it.
pub struct Publisher {
    store: Arc<dyn ReleaseStore>,
    blobs: Arc<dyn BlobStore>,
    formatter: ManifestFormatter,
    force_minisign: bool,
}

/// A committed publish: the record as written plus any deferred work.
pub struct PublishOutcome {
    pub record: ReleaseRecord,
    /// `Some` exactly when this publish created the record; re-publishes
    /// only add a datapoint and skip blob and index writes.
    pub deferred: Option<DeferredWork>,
}

impl std::fmt::Debug for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishOutcome")
            .field("record", &self.record)
            .field("deferred", &self.deferred.is_some())
            .finish()
    }
}

/// Post-commit blob and index writes. Cancellation of the request must
/// not lose these, so the caller hands them to a task that outlives the
/// response (`tokio::spawn` in the HTTP layer).
pub struct DeferredWork {
    store: Arc<dyn ReleaseStore>,
    blobs: Arc<dyn BlobStore>,
    formatter: ManifestFormatter,
    uploads: Vec<BlobUpload>,
}

impl Publisher {
    pub fn new(
        store: Arc<dyn ReleaseStore>,
        blobs: Arc<dyn BlobStore>,
        formatter: ManifestFormatter,
        force_minisign: bool,
    ) -> Self {
        Self {
            store,
            blobs,
            formatter,
            force_minisign,
        }
    }

    /// Validate `request` and apply it to the store.
    pub fn commit(&self, request: &PublishRequest) -> PublishResult<PublishOutcome> {
        let validated = validate_request(request, self.force_minisign)?;
        let zls_version = validated.zls_version.clone();
        let key = zls_version.to_string();

        let by_version = self.store.get(&zls_version)?;

        // A failed build is only a datapoint on a release that exists.
        if validated.artifacts.is_empty() && by_version.is_none() {
            return Err(PublishError::FailedBuildNotUpdatable(key));
        }

        // The (major, minor, commit height) quad is first-writer-wins: a
        // different commit id at an occupied height is a CI mixup, not an
        // update.
        let existing = match &zls_version.dev {
            Some(dev) => {
                let prior = self.store.dev_by_quad(
                    zls_version.major,
                    zls_version.minor,
                    zls_version.patch,
                    dev.commit_height,
                )?;
                if let Some(prior) = &prior {
                    if prior.zls_version.to_string() != key {
                        return Err(PublishError::ConflictingDevCommit {
                            existing: prior.zls_version.to_string(),
                            submitted: key,
                        });
                    }
                }
                prior
            }
            None => by_version,
        };
        let fresh = existing.is_none();

        let record = ReleaseRecord {
            zls_version,
            zig_version: validated.zig_version.clone(),
            minimum_build_zig_version: validated.minimum_build_zig_version.clone(),
            minimum_runtime_zig_version: validated.minimum_runtime_zig_version.clone(),
            date: now_millis(),
            artifacts: validated.artifacts.clone(),
            tested_zig_versions: BTreeMap::new(),
            minisign: (!validated.artifacts.is_empty()).then_some(validated.minisign),
        };

        self.store.publish_batch(
            &record,
            &validated.zig_version.to_string(),
            validated.compatibility,
        )?;
        tracing::info!(
            zls_version = %record.zls_version,
            zig_version = %record.zig_version,
            compatibility = %validated.compatibility,
            fresh,
            "publish committed"
        );

        let deferred = fresh.then(|| DeferredWork {
            store: Arc::clone(&self.store),
            blobs: Arc::clone(&self.blobs),
            formatter: self.formatter.clone(),
            uploads: validated.uploads,
        });

        Ok(PublishOutcome { record, deferred })
    }
}

impl DeferredWork {
    /// Run to completion, logging instead of propagating: the publish
    /// response has already been sent.
    pub async fn run(self) {
        if let Err(err) = self.execute().await {
            tracing::warn!("deferred publish work failed: {err}");
        }
    }

    /// Write the artifact blobs that arrived with bodies, then snapshot
    /// the index. Metadata-only uploads are skipped: their bytes reached
    /// the bucket out-of-band.
    pub async fn execute(&self) -> PublishResult<()> {
        for upload in &self.uploads {
            let Some(body) = &upload.body else {
                continue;
            };
            let options = PutOptions {
                content_type: Some(upload.content_type.to_string()),
                cache_control: Some(ARTIFACT_CACHE_CONTROL.to_string()),
                sha256: Some(upload.shasum.clone()),
            };
            self.blobs.put(&upload.key, body.clone(), &options).await?;
        }
        materialize_index(self.store.as_ref(), self.blobs.as_ref(), &self.formatter).await?;
        Ok(())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

//! Publishing the full `index.json` snapshot to the blob store.

use zver_blob::{BlobStore, PutOptions};
use zver_store::ReleaseStore;

use crate::error::IndexResult;
use crate::manifest::ManifestFormatter;

/// Well-known key of the published index.
pub const INDEX_KEY: &str = "index.json";

/// The index is fronted by a CDN; an hour of staleness is acceptable.
pub const INDEX_CACHE_CONTROL: &str = "public, max-age=3600";

/// Re-render the index over all tagged releases and write it at
/// [`INDEX_KEY`]. Last-writer-wins on the single key; running it twice
/// against unchanged storage produces byte-equal output.
pub async fn materialize_index(
    store: &dyn ReleaseStore,
    blobs: &dyn BlobStore,
    formatter: &ManifestFormatter,
) -> IndexResult<()> {
    let tagged = store.all_tagged_desc()?;
    let index = formatter.full_index(&tagged)?;
    let body = serde_json::to_vec(&index)?;
    blobs
        .put(INDEX_KEY, body, &PutOptions::json(INDEX_CACHE_CONTROL))
        .await?;
    Ok(())
}

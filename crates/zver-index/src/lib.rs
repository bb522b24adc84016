//! Wire manifests and the published `index.json`.
//!
//! The [`ManifestFormatter`] turns release records into the two JSON
//! shapes clients see (single-release lookups and the full index), and
//! [`materialize_index`] snapshots every tagged release into the blob
//! store after a publish.

pub mod error;
pub mod manifest;
pub mod materialize;

pub use error::{IndexError, IndexResult};
pub use manifest::ManifestFormatter;
pub use materialize::{materialize_index, INDEX_CACHE_CONTROL, INDEX_KEY};

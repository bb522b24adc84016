//! Blob storage for the ZLS release coordination service.
//!
//! Release tarballs, their `.minisig` sidecars, and the published
//! `index.json` all live behind the [`BlobStore`] trait; the service
//! never serves tarball bytes itself. Two implementations are provided:
//! [`InMemoryBlobStore`] for tests and [`FsBlobStore`] for single-host
//! deployments fronted by a CDN origin.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::{InMemoryBlobStore, StoredBlob};
pub use traits::{BlobStore, PutOptions};

//! Foundation types for the ZLS release coordination service.
//!
//! Every other `zver` crate depends on this one. It defines the semver
//! dialect the two version streams share, the CI compatibility verdict,
//! and the release record that the store persists.
//!
//! # Key Types
//!
//! - [`Version`] — parser, total order, and classifier for the dialect
//! - [`Compatibility`] — three-valued CI verdict for a (ZLS, Zig) pair
//! - [`ReleaseArtifact`] — one downloadable build for an (os, arch)
//! - [`ReleaseRecord`] — the unit of storage, keyed by ZLS version

pub mod artifact;
pub mod compat;
pub mod error;
pub mod record;
pub mod version;

pub use artifact::{artifact_file_name, uses_arch_os_naming, ArtifactExtension, ReleaseArtifact};
pub use compat::Compatibility;
pub use error::TypeError;
pub use record::ReleaseRecord;
pub use version::{DevSuffix, Version};

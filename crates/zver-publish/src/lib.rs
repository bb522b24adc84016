//! Publish validation and the release write path.
//!
//! CI pushes every (ZLS build, Zig version) result through here. A
//! request runs the ordered validation pipeline in [`validate`], then
//! [`Publisher`] applies the atomic store batch and hands blob and
//! index writes back as [`DeferredWork`] to run after the response.

pub mod error;
pub mod publisher;
pub mod request;
pub mod validate;

pub use error::{PublishError, PublishResult};
pub use publisher::{DeferredWork, Publisher, PublishOutcome};
pub use request::{ArtifactSubmission, PublishRequest};
pub use validate::{validate_request, BlobUpload, ValidatedPublish};

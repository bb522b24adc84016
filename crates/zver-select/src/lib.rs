//! Version selection for the ZLS release coordination service.
//!
//! This is the read path: given a Zig version and a compatibility
//! regime, [`select_version`] answers "which ZLS build should I use?"
//! with either a release record or a typed [`FailureCode`].
//!
//! Tagged Zig versions resolve by release cycle; nightlies go through a
//! three-phase walk over the cycle's development builds (candidate set,
//! support floor, newest admissible) followed by the
//! [`is_enclosed_in_failure`] bracket check over the record's CI
//! datapoints.

pub mod enclosure;
pub mod error;
pub mod failure;
pub mod mode;
pub mod select;

pub use enclosure::{is_enclosed_in_failure, TestedVersion};
pub use error::{SelectError, SelectResult};
pub use failure::FailureCode;
pub use mode::CompatibilityMode;
pub use select::{effective_minimum, list_all_tagged, select_version, SelectOutcome};

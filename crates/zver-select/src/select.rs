//! The version selector: given a Zig version and a compatibility regime,
//! pick the release record a client should use.

use zver_store::ReleaseStore;
use zver_types::{Compatibility, ReleaseRecord, Version};

use crate::enclosure::{is_enclosed_in_failure, TestedVersion};
use crate::error::SelectResult;
use crate::failure::FailureCode;
use crate::mode::CompatibilityMode;

/// The result of a selection query. Both variants are successful HTTP
/// responses; [`Failed`](Self::Failed) carries a wire code, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    Selected(Box<ReleaseRecord>),
    Failed(FailureCode),
}

/// The oldest Zig version a record admits under the given regime.
///
/// Building from source needs both minimums satisfied; running the
/// pre-built binary only needs the runtime minimum.
pub fn effective_minimum(record: &ReleaseRecord, mode: CompatibilityMode) -> Version {
    match mode {
        CompatibilityMode::Full => record
            .minimum_build_zig_version
            .clone()
            .max(record.minimum_runtime_zig_version.clone()),
        CompatibilityMode::OnlyRuntime => record.minimum_runtime_zig_version.clone(),
    }
}

/// Select the ZLS release for `zig_version`, dispatching on whether the
/// client runs a tagged Zig or a nightly.
pub fn select_version(
    store: &dyn ReleaseStore,
    zig_version: &Version,
    mode: CompatibilityMode,
) -> SelectResult<SelectOutcome> {
    if zig_version.is_tagged() {
        select_on_tagged_release(store, zig_version)
    } else {
        select_on_development_build(store, zig_version, mode)
    }
}

/// All tagged releases in index order, newest first.
pub fn list_all_tagged(store: &dyn ReleaseStore) -> SelectResult<Vec<ReleaseRecord>> {
    Ok(store.all_tagged_desc()?)
}

/// Tagged Zig: the matching ZLS minor with the highest patch wins.
fn select_on_tagged_release(
    store: &dyn ReleaseStore,
    zig_version: &Version,
) -> SelectResult<SelectOutcome> {
    let by_minor = store.tagged_by_minor(zig_version.major, zig_version.minor)?;
    if let Some(newest_patch) = by_minor.into_iter().next() {
        return Ok(SelectOutcome::Selected(Box::new(newest_patch)));
    }

    // No release for this minor. Distinguish "too old to ever have one"
    // from "not released yet" via the oldest tagged release.
    let oldest = store.all_tagged_asc()?.into_iter().next();
    match oldest {
        Some(record) if record.minimum_runtime_zig_version > *zig_version => {
            Ok(SelectOutcome::Failed(FailureCode::Unsupported))
        }
        _ => Ok(SelectOutcome::Failed(FailureCode::TaggedReleaseIncompatible)),
    }
}

/// Nightly Zig: pick the newest development build whose declared minimum
/// window admits `zig_version`, then verify the tested-versions map does
/// not bracket it between failures.
fn select_on_development_build(
    store: &dyn ReleaseStore,
    zig_version: &Version,
    mode: CompatibilityMode,
) -> SelectResult<SelectOutcome> {
    // Phase A: candidates, ascending by commit height. When ZLS has not
    // shipped a development build for this cycle yet, the newest tagged
    // release may still cover the young nightly stream.
    let dev = store.dev_by_minor(zig_version.major, zig_version.minor)?;
    let from_dev = !dev.is_empty();
    let candidates = if from_dev {
        dev
    } else {
        store
            .all_tagged_desc()?
            .into_iter()
            .next()
            .map(|record| vec![record])
            .unwrap_or_default()
    };

    let Some(oldest) = candidates.first() else {
        return Ok(SelectOutcome::Failed(FailureCode::DevelopmentBuildUnsupported));
    };

    // Phase B: the support floor is the oldest candidate's minimum.
    if *zig_version < effective_minimum(oldest, mode) {
        let code = if from_dev {
            FailureCode::Unsupported
        } else {
            FailureCode::DevelopmentBuildUnsupported
        };
        return Ok(SelectOutcome::Failed(code));
    }

    // Phase C: newest admissible candidate. Minimums are not monotone in
    // commit height (a later build may raise its floor and a yet later
    // one lower it again), so an inadmissible candidate never ends the
    // scan.
    let mut selected = oldest;
    for candidate in &candidates {
        if *zig_version >= effective_minimum(candidate, mode) {
            selected = candidate;
        }
    }

    // Phase D: reject when the nightly sits in a failed region of the
    // selected record's CI datapoints.
    let tested = tested_outcomes(selected, mode)?;
    if is_enclosed_in_failure(&tested, zig_version) {
        return Ok(SelectOutcome::Failed(FailureCode::DevelopmentBuildIncompatible));
    }

    Ok(SelectOutcome::Selected(Box::new(selected.clone())))
}

/// Collapse a record's tested map to pass/fail under the regime:
/// `only-runtime` verdicts only count as a pass for binary users.
fn tested_outcomes(
    record: &ReleaseRecord,
    mode: CompatibilityMode,
) -> SelectResult<Vec<TestedVersion>> {
    let tested = record
        .tested_versions()?
        .into_iter()
        .map(|(version, compatibility)| {
            let success = match compatibility {
                Compatibility::None => false,
                Compatibility::Full => true,
                Compatibility::OnlyRuntime => mode == CompatibilityMode::OnlyRuntime,
            };
            TestedVersion { version, success }
        })
        .collect();
    Ok(tested)
}

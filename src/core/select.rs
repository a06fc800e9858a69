//! Success/failure value selection
//!
//! Most step inputs come in pairs: a value for successful builds and an
//! `_on_error` variant used when the build failed. [`Selectable`] holds such a
//! pair and picks the effective value for a given [`BuildOutcome`].

/// Status code the CI reports for a successful build.
pub const BUILD_STATUS_SUCCESS: &str = "0";

/// Pipeline statuses that still count as a successful build.
const SUCCESSFUL_PIPELINE_STATUSES: &[&str] = &["", "succeeded", "succeeded_with_abort"];

/// Outcome of the build this step reports on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildOutcome {
    #[default]
    Succeeded,
    Failed,
}

impl BuildOutcome {
    /// Derive the outcome from the build status code and the optional pipeline status.
    ///
    /// The build only counts as successful when the status code is the success
    /// code and the pipeline (if any) has not failed.
    #[must_use]
    pub fn from_status(build_status: &str, pipeline_status: Option<&str>) -> Self {
        let pipeline_ok = SUCCESSFUL_PIPELINE_STATUSES
            .contains(&pipeline_status.unwrap_or("").trim());

        if pipeline_ok && build_status.trim() == BUILD_STATUS_SUCCESS {
            BuildOutcome::Succeeded
        } else {
            BuildOutcome::Failed
        }
    }

    #[must_use]
    pub fn succeeded(self) -> bool {
        matches!(self, BuildOutcome::Succeeded)
    }
}

/// A value type that can act as an `_on_error` override.
pub trait OnErrorOverride {
    /// Whether this value, used as the failure variant, replaces the primary one.
    fn overrides(&self) -> bool;
}

impl OnErrorOverride for String {
    // An empty override means "not configured".
    fn overrides(&self) -> bool {
        !self.is_empty()
    }
}

impl OnErrorOverride for bool {
    fn overrides(&self) -> bool {
        true
    }
}

/// A primary value paired with its failure variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectable<T> {
    pub primary: T,
    pub on_error: T,
}

impl<T: OnErrorOverride + Clone> Selectable<T> {
    pub fn new(primary: T, on_error: T) -> Self {
        Self { primary, on_error }
    }

    /// The effective value for `outcome`.
    #[must_use]
    pub fn get(&self, outcome: BuildOutcome) -> T {
        select(self.primary.clone(), self.on_error.clone(), outcome)
    }
}

/// Pick `primary` for successful builds, `fallback` otherwise.
///
/// A fallback that does not override (an empty string) keeps the primary value
/// even when the build failed.
pub fn select<T: OnErrorOverride>(primary: T, fallback: T, outcome: BuildOutcome) -> T {
    if outcome.succeeded() || !fallback.overrides() {
        primary
    } else {
        fallback
    }
}

//! The two build phases of a versioned documentation run.
//!
//! ## Overview
//!
//! Every selected version moves through this state machine:
//!
//! ```text
//! queued -> prebuilding -> prebuilt | prebuild_failed
//! prebuilt -> building -> built | build_failed
//! ```
//!
//! 1. Pre-build ([`prebuild`]) - a plain build of every candidate into a
//!    throwaway directory, dropping versions that do not build at all.
//! 2. Build ([`build`]) - the real pass with the version flyout, cache reuse
//!    and promotion into the output tree.
//! 3. Aggregation ([`aggregate`]) - redirect page and navigation manifest.
//!
//! [`orchestrator`] chains them. Both phases share the working tree through
//! one [`CheckoutController`] and leave it on the version that was active
//! when they started, see [`restoring`].

use std::fmt;
use std::path::PathBuf;

use log::{debug, error};

use crate::checkout::CheckoutController;
use crate::error::Result;
use crate::version::Version;

pub mod aggregate;
pub mod build;
pub mod orchestrator;
pub mod prebuild;

/// Where a version stands in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Queued,
    Prebuilding,
    Prebuilt,
    PrebuildFailed,
    Building,
    Built,
    BuildFailed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Queued => "queued",
            Self::Prebuilding => "prebuilding",
            Self::Prebuilt => "prebuilt",
            Self::PrebuildFailed => "prebuild_failed",
            Self::Building => "building",
            Self::Built => "built",
            Self::BuildFailed => "build_failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one version in one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub version: Version,
    pub state: BuildState,
    /// Final location of the version's output (empty scratch for pre-builds).
    pub output_path: PathBuf,
}

impl BuildResult {
    pub fn new(version: Version, state: BuildState, output_path: PathBuf) -> Self {
        Self {
            version,
            state,
            output_path,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.state, BuildState::Prebuilt | BuildState::Built)
    }
}

/// Run `body`, then check the version active beforehand out again.
///
/// The restore runs whether `body` succeeded or not, and only when `body`
/// attempted at least one checkout. An error from `body` takes precedence
/// over a failed restore, which is then only logged.
pub fn restoring<'a, T>(
    checkout: &mut CheckoutController<'a>,
    phase: &str,
    body: impl FnOnce(&mut CheckoutController<'a>) -> Result<T>,
) -> Result<T> {
    let origin = checkout.active_version()?;
    let before = checkout.checkouts();

    let outcome = body(checkout);

    if checkout.checkouts() == before {
        return outcome;
    }

    debug!("{}: restoring {}", phase, origin.name);
    let restored = checkout.checkout(&origin);
    match (outcome, restored) {
        (Err(e), Err(restore_err)) => {
            error!(
                "{}: could not restore {} after failure: {}",
                phase, origin.name, restore_err
            );
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(restore_err)) => Err(restore_err),
        (Ok(value), Ok(())) => Ok(value),
    }
}

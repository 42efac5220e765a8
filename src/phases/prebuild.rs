//! Pre-build phase
//!
//! Builds every selected version once, without caching or version-flyout
//! customization, into a scratch directory that is thrown away afterwards.
//! Its only product is the list of versions that build at all.
//!
//! The first failing build ends the phase: it is logged, the failed version
//! and every version after it are dropped, and the versions already
//! pre-built go on to the real build. Anything other than a failed build
//! (a checkout or submodule error, a tool that cannot be launched) is fatal.

use log::{error, info};
use tempfile::TempDir;

use crate::builder::{BuildStatus, BuildTool, Invocation};
use crate::checkout::CheckoutController;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::phases::{restoring, BuildResult, BuildState};
use crate::version::Version;

/// Run the pre-build phase over `versions`, in order.
///
/// Returns one result per attempted version; versions after the first
/// failure are not attempted and have no result.
pub fn execute(
    checkout: &mut CheckoutController<'_>,
    tool: &dyn BuildTool,
    config: &BuildConfig,
    versions: &[Version],
) -> Result<Vec<BuildResult>> {
    restoring(checkout, "pre-build", |checkout| {
        let mut results = Vec::with_capacity(versions.len());
        for version in versions {
            let result = prebuild_one(checkout, tool, config, version)?;
            let failed = !result.succeeded();
            results.push(result);
            if failed {
                break;
            }
        }
        Ok(results)
    })
}

/// Versions that survived the pre-build, in order.
pub fn survivors(results: &[BuildResult]) -> Vec<Version> {
    results
        .iter()
        .filter(|r| r.succeeded())
        .map(|r| r.version.clone())
        .collect()
}

fn prebuild_one(
    checkout: &mut CheckoutController<'_>,
    tool: &dyn BuildTool,
    config: &BuildConfig,
    version: &Version,
) -> Result<BuildResult> {
    info!("pre-building: {}", version.name);
    checkout.checkout(version)?;

    let scratch = TempDir::new()?;
    let status = tool.invoke(&Invocation {
        source: config.source_dir(),
        destination: scratch.path(),
        working_dir: &config.chdir,
        version,
        verbosity: config.verbosity,
        options: None,
    })?;

    let state = match status {
        BuildStatus::Succeeded => BuildState::Prebuilt,
        BuildStatus::Failed { code } => {
            let err = Error::ExternalBuild {
                version: version.name.clone(),
                code,
            };
            error!("pre-build: {}; skipping the remaining pre-builds", err);
            BuildState::PrebuildFailed
        }
    };
    Ok(BuildResult::new(
        version.clone(),
        state,
        scratch.path().to_path_buf(),
    ))
}

//! Real build phase
//!
//! For each version, in selection order:
//!
//! 1. Classify its cache entry.
//! 2. `Valid`: copy the cached tree to the output and skip the build.
//! 3. Excluded by `update_only`: reuse an `Outdated` cache as-is; a `Missing`
//!    cache leaves nothing to serve and the version fails on its own.
//! 4. Otherwise: seed a scratch directory with an `Outdated` cache, check the
//!    version out, build with the version flyout, stamp the commit marker and
//!    promote the scratch directory into `<output>/<version>`.
//!
//! A failed build aborts the whole phase. Versions after it are never
//! touched, so their output directories are not created.

use std::path::PathBuf;

use log::{info, warn};
use tempfile::TempDir;

use crate::builder::{BuildStatus, BuildTool, Invocation};
use crate::cache::{self, CacheEntry, CacheManager, CacheState};
use crate::checkout::CheckoutController;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::filesystem;
use crate::phases::{restoring, BuildResult, BuildState};
use crate::version::Version;

/// Run the real build phase over `versions`, in order.
pub fn execute(
    checkout: &mut CheckoutController<'_>,
    tool: &dyn BuildTool,
    cache: &CacheManager,
    config: &BuildConfig,
    versions: &[Version],
) -> Result<Vec<BuildResult>> {
    restoring(checkout, "build", |checkout| {
        versions
            .iter()
            .map(|version| build_one(checkout, tool, cache, config, version))
            .collect()
    })
}

fn build_one(
    checkout: &mut CheckoutController<'_>,
    tool: &dyn BuildTool,
    cache: &CacheManager,
    config: &BuildConfig,
    version: &Version,
) -> Result<BuildResult> {
    let destination = config.output_dir.join(version.dir_name());
    let entry = cache.classify(version, version.commit.as_deref())?;

    if entry.state == CacheState::Valid {
        info!("{} is up to date, reusing cached build", version.name);
        cache.reuse(&entry, &destination)?;
        return Ok(BuildResult::new(
            version.clone(),
            BuildState::Built,
            destination,
        ));
    }

    if !config.should_rebuild(&version.name) {
        return reuse_without_rebuild(cache, &entry, version, destination);
    }

    info!("building: {}", version.name);
    let scratch = TempDir::new()?;
    if entry.state == CacheState::Outdated {
        info!("seeding build of {} with outdated cache", version.name);
        cache.reuse(&entry, scratch.path())?;
    }

    checkout.checkout(version)?;
    let status = tool.invoke(&Invocation {
        source: config.source_dir(),
        destination: scratch.path(),
        working_dir: &config.chdir,
        version,
        verbosity: config.verbosity,
        options: Some(&config.options),
    })?;

    if let BuildStatus::Failed { code } = status {
        return Err(Error::ExternalBuild {
            version: version.name.clone(),
            code,
        });
    }

    let commit = match &version.commit {
        Some(commit) => commit.clone(),
        None => checkout.head_commit()?.unwrap_or_default(),
    };
    cache::write_marker(scratch.path(), &commit)?;
    filesystem::copy_tree(scratch.path(), &destination)?;
    info!("build succeeded for {}", version.name);

    Ok(BuildResult::new(
        version.clone(),
        BuildState::Built,
        destination,
    ))
}

fn reuse_without_rebuild(
    cache: &CacheManager,
    entry: &CacheEntry,
    version: &Version,
    destination: PathBuf,
) -> Result<BuildResult> {
    match entry.state {
        CacheState::Missing => {
            warn!(
                "{} is not selected for update and has no cached build; it will be missing",
                version.name
            );
            Ok(BuildResult::new(
                version.clone(),
                BuildState::BuildFailed,
                destination,
            ))
        }
        _ => {
            info!("{} is not selected for update, serving cached build", version.name);
            cache.reuse(entry, &destination)?;
            Ok(BuildResult::new(
                version.clone(),
                BuildState::Built,
                destination,
            ))
        }
    }
}

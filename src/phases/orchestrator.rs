//! Orchestrator for a complete versioned build
//!
//! This module chains the steps of one run:
//!
//! 1. Compile the selection patterns and load the catalog. Both can fail
//!    before anything in the working tree changes.
//! 2. Resolve the selection into the ordered build set.
//! 3. Pre-build (unless disabled) and keep the survivors.
//! 4. Real build with cache reuse.
//! 5. Aggregate the built versions into the redirect page and manifest.
//!
//! Each phase restores the working tree on its own, so whatever happens the
//! version active before the run is active after it.

use log::{debug, info, warn};

use crate::builder::BuildTool;
use crate::cache::CacheManager;
use crate::catalog::VersionCatalog;
use crate::checkout::CheckoutController;
use crate::config::BuildConfig;
use crate::defaults::DEFAULT_MAIN_BRANCH;
use crate::error::Result;
use crate::phases::aggregate::{self, Summary};
use crate::phases::{build, prebuild, BuildResult};
use crate::repository::VersionControl;
use crate::selection::Selector;
use crate::version::Version;

/// What a run would build, computed without touching the working tree.
#[derive(Debug, Clone)]
pub struct Plan {
    pub catalog: VersionCatalog,
    pub selection: Vec<Version>,
    /// Version the top-level page will redirect to.
    pub main_version: String,
}

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct Report {
    pub prebuild: Vec<BuildResult>,
    pub build: Vec<BuildResult>,
    pub summary: Summary,
}

/// Validate the repository and resolve the build set.
pub fn plan(vcs: &dyn VersionControl, config: &BuildConfig) -> Result<Plan> {
    resolve_plan(vcs, config, true)
}

/// Resolve the build set for display only.
///
/// Uncommitted changes are tolerated since nothing will be checked out.
pub fn preview(vcs: &dyn VersionControl, config: &BuildConfig) -> Result<Plan> {
    resolve_plan(vcs, config, false)
}

fn resolve_plan(vcs: &dyn VersionControl, config: &BuildConfig, validate: bool) -> Result<Plan> {
    let selector = Selector::new(
        &config.select_branches,
        &config.exclude_branches,
        config.branch_regex.as_deref(),
        config.force_branches,
    )?;
    let catalog = if validate {
        VersionCatalog::load(vcs, config.force_branches)?
    } else {
        VersionCatalog::enumerate(vcs, config.force_branches)?
    };
    let selection = selector
        .resolve(&catalog)
        .into_iter()
        .map(|version| resolve_unknown(vcs, version))
        .collect::<Result<Vec<_>>>()?;

    let main_version = match &config.main_branch {
        Some(name) => name.clone(),
        None if config.force_branches => CheckoutController::new(vcs).active_version()?.name,
        None => DEFAULT_MAIN_BRANCH.to_string(),
    };
    debug!("main version: {}", main_version);

    Ok(Plan {
        catalog,
        selection,
        main_version,
    })
}

/// Give forced selections the commit their reference points at, so their
/// cache can be validated like any other version's.
fn resolve_unknown(vcs: &dyn VersionControl, version: Version) -> Result<Version> {
    if version.commit.is_some() {
        return Ok(version);
    }
    let commit = vcs.resolve_commit(&version.reference)?;
    if commit.is_none() {
        warn!(
            "`{}` does not resolve to a commit; the checkout will likely fail",
            version.reference
        );
    }
    Ok(Version::pseudo(&version.reference, commit))
}

/// Run the whole pipeline.
pub fn execute(
    vcs: &dyn VersionControl,
    tool: &dyn BuildTool,
    config: &BuildConfig,
) -> Result<Report> {
    let plan = plan(vcs, config)?;
    if plan.selection.is_empty() {
        warn!("no versions selected, nothing to build");
    }

    let mut checkout = CheckoutController::new(vcs);
    let cache = CacheManager::new(config.cache.clone());

    let (prebuild_results, candidates) = if config.prebuild {
        let results = prebuild::execute(&mut checkout, tool, config, &plan.selection)?;
        let survivors = prebuild::survivors(&results);
        info!(
            "pre-build passed for {} of {} versions",
            survivors.len(),
            plan.selection.len()
        );
        (results, survivors)
    } else {
        debug!("pre-build disabled");
        (Vec::new(), plan.selection.clone())
    };

    let build_results = build::execute(&mut checkout, tool, &cache, config, &candidates)?;
    let summary = aggregate::execute(&build_results, &config.output_dir, &plan.main_version)?;

    Ok(Report {
        prebuild: prebuild_results,
        build: build_results,
        summary,
    })
}

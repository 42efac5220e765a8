//! Build command implementation
//!
//! The build command runs the complete versioned build:
//! 1. Load and validate the configuration
//! 2. Validate the repository and resolve the selection
//! 3. Pre-build every selected version
//! 4. Build the survivors, reusing cached output where possible
//! 5. Write the redirect page and navigation manifest
//!
//! With `--dry-run` it stops after step 2 and prints the plan. A dry run
//! accepts uncommitted changes since nothing is checked out.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use versioned_docs::builder::SphinxBuild;
use versioned_docs::config::Settings;
use versioned_docs::output::{self, OutputConfig};
use versioned_docs::phases::orchestrator;
use versioned_docs::repository::SystemGit;

use super::{base_dirs, layered_settings};

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Path to config file (default: .versioned-docs.yaml if present)
    #[arg(short, long, value_name = "PATH", env = "VERSIONED_DOCS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Make this the working directory before running
    #[arg(long, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Path to a directory inside the repository (default: working directory)
    #[arg(long, value_name = "DIR")]
    pub git_root: Option<PathBuf>,

    /// Path to conf.py, or the directory containing it [default: docs/conf.py]
    #[arg(long, value_name = "PATH")]
    pub local_conf: Option<PathBuf>,

    /// Output directory [default: docs/_build]
    #[arg(short = 'O', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Versions to build, as glob patterns (repeatable or comma separated)
    #[arg(short = 'b', long = "branches", value_name = "PATTERN", value_delimiter = ',')]
    pub select: Vec<String>,

    /// Versions to leave out, as glob patterns (repeatable or comma separated)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Also build versions whose name starts with a match of this regex
    #[arg(long, value_name = "REGEX")]
    pub branch_regex: Option<String>,

    /// Version the top-level index.html redirects to [default: main]
    #[arg(short = 'm', long, value_name = "NAME")]
    pub main_branch: Option<String>,

    /// Build a detached HEAD and selections that are not known branches or tags
    #[arg(short, long)]
    pub force: bool,

    /// Skip the pre-build pass
    #[arg(long)]
    pub no_prebuild: bool,

    /// Let sphinx-build print its normal output
    #[arg(long)]
    pub no_quiet: bool,

    /// Verbose sphinx-build output and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding a previous build to reuse (often the output directory)
    #[arg(long, value_name = "DIR", env = "VERSIONED_DOCS_CACHE")]
    pub cache: Option<PathBuf>,

    /// Only rebuild versions matching this glob; others are served from the cache
    #[arg(long, value_name = "PATTERN")]
    pub update_only: Option<String>,

    /// Reset the intersphinx mapping while building
    #[arg(long)]
    pub reset_intersphinx: bool,

    /// Show the version selector as a floating badge
    #[arg(long)]
    pub floating_badge: bool,

    /// Remote whose branches are built [default: origin]
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// sphinx-build executable [default: found on PATH, else python3 -m sphinx]
    #[arg(long, value_name = "PATH")]
    pub sphinx_build: Option<PathBuf>,

    /// Show what would be built without checking anything out
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl BuildArgs {
    /// The command-line configuration layer.
    ///
    /// Switches only ever override toward their non-default value.
    pub fn settings(&self) -> Settings {
        Settings {
            chdir: self.chdir.clone(),
            git_root: self.git_root.clone(),
            local_conf: self.local_conf.clone(),
            output_dir: self.output_dir.clone(),
            select_branches: (!self.select.is_empty()).then(|| self.select.clone()),
            exclude_branches: (!self.exclude.is_empty()).then(|| self.exclude.clone()),
            branch_regex: self.branch_regex.clone(),
            main_branch: self.main_branch.clone(),
            force_branches: self.force.then_some(true),
            prebuild: self.no_prebuild.then_some(false),
            quiet: self.no_quiet.then_some(false),
            verbose: self.verbose.then_some(true),
            cache: self.cache.clone(),
            update_only: self.update_only.clone(),
            reset_intersphinx_mapping: self.reset_intersphinx.then_some(true),
            floating_badge: self.floating_badge.then_some(true),
            remote: self.remote.clone(),
            sphinx_build: self.sphinx_build.clone(),
        }
    }
}

/// Execute the build command
pub fn execute(args: BuildArgs, output: &OutputConfig) -> Result<()> {
    let (cwd, base) = base_dirs(args.chdir.as_deref())?;
    let config = layered_settings(&base, args.config.as_deref(), args.settings())?.resolve(&cwd)?;
    let vcs = SystemGit::open(&config.git_root, &config.remote)?;

    if args.dry_run {
        let plan = orchestrator::preview(&vcs, &config)?;
        println!("Would build {} version(s):", plan.selection.len());
        for version in &plan.selection {
            println!(
                "  {} {}",
                version.name,
                output::dim(output, &format!("({})", version.kind))
            );
        }
        println!("Main version: {}", plan.main_version);
        println!("Output: {}", config.output_dir.display());
        return Ok(());
    }

    let tool = SphinxBuild::detect(config.sphinx_build.as_deref())?;
    let report = orchestrator::execute(&vcs, &tool, &config)?;

    println!("{}", output::success_line(output, &report.summary.built));
    Ok(())
}

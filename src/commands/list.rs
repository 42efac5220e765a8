//! # List Command Implementation
//!
//! This module implements the `list` subcommand, which prints every version
//! the repository offers for building: tags first, then the branches of the
//! tracked remote, then the detached `HEAD` with `--force`.
//!
//! This command is read-only. Unlike `build` it also works with uncommitted
//! changes in the working tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use versioned_docs::catalog::VersionCatalog;
use versioned_docs::config::Settings;
use versioned_docs::defaults::DEFAULT_REMOTE;
use versioned_docs::output::{self, OutputConfig};
use versioned_docs::repository::SystemGit;
use versioned_docs::version::Version;

use super::{base_dirs, layered_settings};

/// List the versions that can be built
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Path to config file (default: .versioned-docs.yaml if present)
    #[arg(short, long, value_name = "PATH", env = "VERSIONED_DOCS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Make this the working directory before running
    #[arg(long, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Path to a directory inside the repository (default: working directory)
    #[arg(long, value_name = "DIR")]
    pub git_root: Option<PathBuf>,

    /// Remote whose branches are listed [default: origin]
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Include a detached HEAD
    #[arg(short, long)]
    pub force: bool,

    /// Print the versions as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, output: &OutputConfig) -> Result<()> {
    let (cwd, base) = base_dirs(args.chdir.as_deref())?;
    let cli = Settings {
        chdir: args.chdir.clone(),
        git_root: args.git_root.clone(),
        remote: args.remote.clone(),
        force_branches: args.force.then_some(true),
        ..Settings::default()
    };
    let settings = layered_settings(&base, args.config.as_deref(), cli)?;

    let chdir = settings.chdir.map_or_else(|| cwd.clone(), |dir| cwd.join(dir));
    let git_root = settings.git_root.map_or_else(|| chdir.clone(), |p| chdir.join(p));
    let remote = settings
        .remote
        .unwrap_or_else(|| DEFAULT_REMOTE.to_string());

    let vcs = SystemGit::open(&git_root, &remote)?;
    let catalog = VersionCatalog::enumerate(&vcs, settings.force_branches.unwrap_or(false))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog.all())?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No tags or {} branches found.", remote);
        return Ok(());
    }

    for version in catalog.all() {
        println!("{}", format_line(version, output));
    }
    Ok(())
}

/// `<kind> <name> <short commit>`, kind padded for alignment.
fn format_line(version: &Version, output: &OutputConfig) -> String {
    let commit = version
        .commit
        .as_deref()
        .map(|c| c.get(..7).unwrap_or(c))
        .unwrap_or("-");
    format!(
        "{:<8} {} {}",
        version.kind.to_string(),
        version.name,
        output::dim(output, commit)
    )
}

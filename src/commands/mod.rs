//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `versioned-docs` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `versioned_docs` library.

pub mod build;
pub mod completions;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use versioned_docs::config::Settings;

/// Current directory, and the directory `--chdir` points at relative to it.
pub fn base_dirs(chdir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let base = chdir.map_or_else(|| cwd.clone(), |dir| cwd.join(dir));
    Ok((cwd, base))
}

/// Configuration file layer overlaid with the command-line layer.
pub fn layered_settings(base: &Path, config: Option<&Path>, cli: Settings) -> Result<Settings> {
    let file = Settings::discover(base, config)
        .with_context(|| format!("Failed to load configuration in {}", base.display()))?;
    Ok(file.overlay(cli))
}

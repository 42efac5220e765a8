//! # Run Configuration
//!
//! A run is described by one immutable [`BuildConfig`]. It is assembled from
//! three layers, lowest precedence first:
//!
//! 1. built-in defaults (see [`crate::defaults`]);
//! 2. an optional YAML file, `.versioned-docs.yaml` in the working directory
//!    or the file named by `--config`;
//! 3. command-line flags.
//!
//! Layers 2 and 3 are both expressed as [`Settings`], where every field is
//! optional, and combined with [`Settings::overlay`]. [`Settings::resolve`]
//! then fills in defaults, resolves relative paths against `chdir` and
//! validates what can be validated before the repository is touched.
//!
//! ## File format
//!
//! ```yaml
//! output_dir: site
//! select_branches: ["main", "v*"]
//! exclude_branches: ["v0.*"]
//! main_branch: main
//! cache: site
//! floating_badge: true
//! ```
//!
//! Unknown keys are rejected so that a misspelled option does not silently
//! fall back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::debug;
use serde::Deserialize;

use crate::builder::{BuildOptions, Verbosity};
use crate::defaults::{
    CONF_FILE_NAME, DEFAULT_CONFIG_FILENAME, DEFAULT_LOCAL_CONF, DEFAULT_OUTPUT_DIR,
    DEFAULT_REMOTE,
};
use crate::error::{Error, Result};

/// One configuration layer; `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base directory all relative paths resolve against.
    pub chdir: Option<PathBuf>,
    /// Directory inside the repository to build from.
    pub git_root: Option<PathBuf>,
    /// Path to `conf.py`, or the directory containing it.
    pub local_conf: Option<PathBuf>,
    /// Output root.
    pub output_dir: Option<PathBuf>,
    /// Include globs.
    pub select_branches: Option<Vec<String>>,
    /// Exclude globs.
    pub exclude_branches: Option<Vec<String>>,
    /// Regex matched at the start of version names.
    pub branch_regex: Option<String>,
    /// Version the top-level page redirects to.
    pub main_branch: Option<String>,
    /// Build the detached `HEAD` and unknown selections.
    pub force_branches: Option<bool>,
    /// Run the pre-build pass.
    pub prebuild: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    /// Cache root; unset disables caching.
    pub cache: Option<PathBuf>,
    /// Glob of versions that are really rebuilt.
    pub update_only: Option<String>,
    pub reset_intersphinx_mapping: Option<bool>,
    pub floating_badge: Option<bool>,
    /// Remote whose branches are enumerated.
    pub remote: Option<String>,
    /// Explicit `sphinx-build` executable.
    pub sphinx_build: Option<PathBuf>,
}

impl Settings {
    /// Parse a YAML configuration document.
    ///
    /// An empty (or comment-only) document yields empty settings.
    pub fn parse(yaml: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some(format!(
                "Check the option names in {}; unknown keys are rejected",
                DEFAULT_CONFIG_FILENAME
            )),
        })
    }

    /// Load settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                what: "Configuration file".to_string(),
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        debug!("loading configuration from {}", path.display());
        Self::parse(&content)
    }

    /// Find the file layer.
    ///
    /// An explicit path must exist. Without one, the default file in `dir`
    /// is used when present and empty settings otherwise.
    pub fn discover(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(&dir.join(path)),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILENAME);
                if candidate.is_file() {
                    Self::from_file(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Combine two layers; fields set in `over` win.
    pub fn overlay(self, over: Settings) -> Settings {
        Settings {
            chdir: over.chdir.or(self.chdir),
            git_root: over.git_root.or(self.git_root),
            local_conf: over.local_conf.or(self.local_conf),
            output_dir: over.output_dir.or(self.output_dir),
            select_branches: over.select_branches.or(self.select_branches),
            exclude_branches: over.exclude_branches.or(self.exclude_branches),
            branch_regex: over.branch_regex.or(self.branch_regex),
            main_branch: over.main_branch.or(self.main_branch),
            force_branches: over.force_branches.or(self.force_branches),
            prebuild: over.prebuild.or(self.prebuild),
            quiet: over.quiet.or(self.quiet),
            verbose: over.verbose.or(self.verbose),
            cache: over.cache.or(self.cache),
            update_only: over.update_only.or(self.update_only),
            reset_intersphinx_mapping: over
                .reset_intersphinx_mapping
                .or(self.reset_intersphinx_mapping),
            floating_badge: over.floating_badge.or(self.floating_badge),
            remote: over.remote.or(self.remote),
            sphinx_build: over.sphinx_build.or(self.sphinx_build),
        }
    }

    /// Fill in defaults and validate, resolving relative paths against
    /// `chdir` (itself relative to `cwd`).
    pub fn resolve(self, cwd: &Path) -> Result<BuildConfig> {
        let chdir = match self.chdir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        if !chdir.is_dir() {
            return Err(Error::ConfigNotFound {
                what: "Working directory".to_string(),
                path: chdir,
            });
        }

        let git_root = self
            .git_root
            .map_or_else(|| chdir.clone(), |p| chdir.join(p));

        let mut local_conf = chdir.join(
            self.local_conf
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_CONF)),
        );
        if local_conf.file_name().is_none_or(|name| name != CONF_FILE_NAME) {
            local_conf.push(CONF_FILE_NAME);
        }
        if !local_conf.is_file() {
            return Err(Error::ConfigNotFound {
                what: CONF_FILE_NAME.to_string(),
                path: local_conf,
            });
        }

        let update_only = self
            .update_only
            .as_deref()
            .map(Pattern::new)
            .transpose()?;
        if let Some(regex) = &self.branch_regex {
            regex::Regex::new(regex)?;
        }

        let config = BuildConfig {
            output_dir: chdir.join(
                self.output_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            ),
            cache: self.cache.map(|p| chdir.join(p)),
            sphinx_build: self.sphinx_build.map(|p| {
                if p.components().count() > 1 {
                    chdir.join(p)
                } else {
                    p
                }
            }),
            git_root,
            local_conf,
            select_branches: self.select_branches.unwrap_or_default(),
            exclude_branches: self.exclude_branches.unwrap_or_default(),
            branch_regex: self.branch_regex,
            main_branch: self.main_branch,
            force_branches: self.force_branches.unwrap_or(false),
            prebuild: self.prebuild.unwrap_or(true),
            verbosity: Verbosity {
                quiet: self.quiet.unwrap_or(true),
                verbose: self.verbose.unwrap_or(false),
            },
            update_only,
            options: BuildOptions {
                reset_intersphinx_mapping: self.reset_intersphinx_mapping.unwrap_or(false),
                floating_badge: self.floating_badge.unwrap_or(false),
            },
            remote: self.remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            chdir,
        };
        debug!("resolved configuration: {:?}", config);
        Ok(config)
    }
}

/// Fully resolved configuration of one run. All paths are absolute.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub chdir: PathBuf,
    pub git_root: PathBuf,
    /// The `conf.py` file; its directory is the documentation source.
    pub local_conf: PathBuf,
    pub output_dir: PathBuf,
    pub select_branches: Vec<String>,
    pub exclude_branches: Vec<String>,
    pub branch_regex: Option<String>,
    /// `None` defers to the active version (with `force`) or `main`.
    pub main_branch: Option<String>,
    pub force_branches: bool,
    pub prebuild: bool,
    pub verbosity: Verbosity,
    pub cache: Option<PathBuf>,
    pub update_only: Option<Pattern>,
    pub options: BuildOptions,
    pub remote: String,
    pub sphinx_build: Option<PathBuf>,
}

impl BuildConfig {
    /// Directory handed to the build tool as its source.
    pub fn source_dir(&self) -> &Path {
        self.local_conf.parent().unwrap_or(&self.chdir)
    }

    /// Whether `name` is really rebuilt under `update_only`.
    pub fn should_rebuild(&self, name: &str) -> bool {
        self.update_only
            .as_ref()
            .is_none_or(|pattern| pattern.matches(name))
    }
}

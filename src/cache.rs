//! # Build Cache
//!
//! Previous builds can be reused when the commit they were built from has
//! not moved. The cache is a plain directory tree:
//!
//! ```text
//! <cache root>/
//!   v1.0/            full output of the last v1.0 build
//!     .sha           commit the output was built from
//!     index.html
//!   feature_login/   branch `feature/login`, separators replaced
//! ```
//!
//! Pointing the cache root at the previous output directory is the usual
//! setup: every successful build leaves its marker behind, so the next run
//! classifies unchanged versions as valid.
//!
//! Classification never writes anything. The marker is written by the build
//! phase after a successful real build.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::filesystem;
use crate::version::Version;

/// Name of the file recording the commit a build was made from.
pub const MARKER_FILE: &str = ".sha";

/// Reusability of a cached build for the version's current commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No marker, or caching disabled.
    Missing,
    /// A marker exists but records a different commit.
    Outdated,
    /// The marker records the current commit.
    Valid,
}

/// Cache descriptor for one version, computed fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Cached output directory, `None` when caching is disabled.
    pub path: Option<PathBuf>,
    /// Commit read from the marker file.
    pub recorded_commit: Option<String>,
    pub state: CacheState,
}

impl CacheEntry {
    fn missing(path: Option<PathBuf>) -> Self {
        Self {
            path,
            recorded_commit: None,
            state: CacheState::Missing,
        }
    }
}

/// Classifies cached builds and copies them back out.
#[derive(Debug, Clone, Default)]
pub struct CacheManager {
    root: Option<PathBuf>,
}

impl CacheManager {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    /// `<cache root>/<sanitized version name>`, if caching is enabled.
    pub fn entry_path(&self, version: &Version) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(version.dir_name()))
    }

    /// Compare the cached marker of `version` against `commit`.
    ///
    /// An unknown `commit` can never be proven current, so an existing
    /// marker is then reported as outdated.
    pub fn classify(&self, version: &Version, commit: Option<&str>) -> Result<CacheEntry> {
        let Some(path) = self.entry_path(version) else {
            return Ok(CacheEntry::missing(None));
        };

        let Some(recorded) = read_marker(&path)? else {
            return Ok(CacheEntry::missing(Some(path)));
        };

        let state = if commit == Some(recorded.as_str()) {
            CacheState::Valid
        } else {
            CacheState::Outdated
        };
        debug!(
            "cache for {}: {:?} (recorded {}, current {})",
            version,
            state,
            recorded,
            commit.unwrap_or("unknown")
        );

        Ok(CacheEntry {
            path: Some(path),
            recorded_commit: Some(recorded),
            state,
        })
    }

    /// Merge the cached tree of `entry` into `destination`.
    ///
    /// Nothing is copied when the cache directory already is the destination.
    pub fn reuse(&self, entry: &CacheEntry, destination: &Path) -> Result<()> {
        let Some(source) = entry.path.as_deref() else {
            return Err(Error::Cache {
                message: "cannot reuse a cache entry while caching is disabled".to_string(),
            });
        };

        if entry.state == CacheState::Missing {
            return Err(Error::Cache {
                message: format!("no cached build at {}", source.display()),
            });
        }

        if filesystem::same_location(source, destination) {
            debug!("cache at {} is the destination; nothing to copy", source.display());
            return Ok(());
        }

        let copied = filesystem::copy_tree(source, destination)?;
        debug!(
            "copied {} cached files from {} to {}",
            copied,
            source.display(),
            destination.display()
        );
        Ok(())
    }
}

/// Read the commit recorded in `dir`, `None` if there is no marker.
pub fn read_marker(dir: &Path) -> Result<Option<String>> {
    let marker = dir.join(MARKER_FILE);
    if !marker.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&marker)?;
    Ok(Some(content.trim().to_string()))
}

/// Record `commit` as the source of the build in `dir`.
pub fn write_marker(dir: &Path, commit: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(MARKER_FILE), commit)?;
    Ok(())
}

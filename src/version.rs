//! # Buildable Versions
//!
//! A [`Version`] is one unit the orchestrator can check out and build: a tag,
//! a remote branch, or a detached commit. Versions are created by the
//! catalog (or synthesized by the selector under `--force`) and never change
//! afterwards.
//!
//! Each version has two names:
//!
//! - `name`: what users select and what appears in navigation (`main`,
//!   `v1.0`, `feature/login`).
//! - `reference`: what is handed to `git checkout` (`origin/main`,
//!   `refs/tags/v1.0`, a commit hash).
//!
//! Output and cache directories are derived from `name` with path separators
//! replaced, see [`Version::dir_name`].

use std::fmt;

use serde::Serialize;

/// The kind of reference a version was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    /// A tag, checked out by path.
    Tag,
    /// A branch (remote-tracking, or the locally active one).
    Branch,
    /// A detached commit, or a forced reference that is not in the catalog.
    Detached,
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Branch => write!(f, "branch"),
            Self::Detached => write!(f, "detached"),
        }
    }
}

/// One buildable version of the documentation source tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    /// Display and selection name, unique within its kind.
    pub name: String,
    /// Kind of reference.
    pub kind: VersionKind,
    /// What `git checkout` receives for this version.
    pub reference: String,
    /// Commit the reference pointed at when the catalog was built.
    ///
    /// `None` only for forced selections that could not be resolved.
    pub commit: Option<String>,
}

impl Version {
    /// A tag; checked out through its full `refs/tags/` path.
    pub fn tag(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: VersionKind::Tag,
            reference: format!("refs/tags/{}", name),
            commit: Some(commit.to_string()),
        }
    }

    /// A remote-tracking branch `<remote>/<name>`.
    pub fn remote_branch(remote: &str, name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: VersionKind::Branch,
            reference: format!("{}/{}", remote, name),
            commit: Some(commit.to_string()),
        }
    }

    /// A local branch, checked out by its own name.
    pub fn local_branch(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: VersionKind::Branch,
            reference: name.to_string(),
            commit: Some(commit.to_string()),
        }
    }

    /// A detached commit; name and reference are the commit hash.
    pub fn detached(commit: &str) -> Self {
        Self {
            name: commit.to_string(),
            kind: VersionKind::Detached,
            reference: commit.to_string(),
            commit: Some(commit.to_string()),
        }
    }

    /// A forced selection of a reference the catalog does not know.
    pub fn pseudo(reference: &str, commit: Option<String>) -> Self {
        Self {
            name: reference.to_string(),
            kind: VersionKind::Detached,
            reference: reference.to_string(),
            commit,
        }
    }

    pub fn is_tag(&self) -> bool {
        self.kind == VersionKind::Tag
    }

    /// Directory name used under both the output root and the cache root.
    pub fn dir_name(&self) -> String {
        sanitize_dir_name(&self.name)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Replace path separators so a version name maps onto a single directory.
pub fn sanitize_dir_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

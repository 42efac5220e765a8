//! # Version-Control Collaborator
//!
//! The orchestrator never talks to `git` directly. It depends on the
//! [`VersionControl`] trait, which exposes exactly the operations a versioned
//! build needs: enumerate branches and tags, query the active state, check
//! out, and keep submodules in step.
//!
//! [`SystemGit`] is the real implementation, delegating to the `git` module.
//! Tests replace it with an in-memory fake so the checkout protocol and the
//! build phases can be exercised without a repository on disk.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git;
use crate::version::Version;

/// Operations the orchestration requires from the version-control system.
pub trait VersionControl {
    /// Root of the working tree.
    fn root(&self) -> &Path;

    /// Every tag, in the order the system lists them.
    fn tags(&self) -> Result<Vec<Version>>;

    /// Every branch of the tracked remote.
    fn remote_branches(&self) -> Result<Vec<Version>>;

    /// Commit `HEAD` points at, `None` for a repository without history.
    fn head_commit(&self) -> Result<Option<String>>;

    /// Resolve an arbitrary reference to a commit.
    fn resolve_commit(&self, reference: &str) -> Result<Option<String>>;

    fn is_detached(&self) -> Result<bool>;

    /// Name of the branch `HEAD` is attached to.
    fn current_branch(&self) -> Result<String>;

    /// Whether tracked files carry uncommitted modifications.
    fn is_dirty(&self) -> Result<bool>;

    /// Forced checkout by path, recursing into submodules (tags).
    fn checkout_path(&self, reference: &str) -> Result<()>;

    /// Forced checkout by name (branches, commits).
    fn checkout(&self, reference: &str) -> Result<()>;

    fn submodule_sync(&self) -> Result<()>;

    fn submodule_deinit(&self) -> Result<()>;

    /// Forced, recursive `submodule update --init`.
    fn submodule_update(&self) -> Result<()>;
}

/// [`VersionControl`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct SystemGit {
    root: PathBuf,
    remote: String,
}

impl SystemGit {
    /// Open the repository containing `path`, tracking branches of `remote`.
    pub fn open(path: &Path, remote: &str) -> Result<Self> {
        let root = git::toplevel(path).map_err(|e| Error::RepositoryState {
            path: path.to_path_buf(),
            message: format!("not a git work tree ({})", e),
            hint: Some("Pass --git-root pointing inside the documentation repository".to_string()),
        })?;
        Ok(Self {
            root,
            remote: remote.to_string(),
        })
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }
}

impl VersionControl for SystemGit {
    fn root(&self) -> &Path {
        &self.root
    }

    fn tags(&self) -> Result<Vec<Version>> {
        Ok(git::list_tags(&self.root)?
            .into_iter()
            .map(|(name, commit)| Version::tag(&name, &commit))
            .collect())
    }

    fn remote_branches(&self) -> Result<Vec<Version>> {
        Ok(git::list_remote_branches(&self.root, &self.remote)?
            .into_iter()
            .map(|(name, commit)| Version::remote_branch(&self.remote, &name, &commit))
            .collect())
    }

    fn head_commit(&self) -> Result<Option<String>> {
        git::head_commit(&self.root)
    }

    fn resolve_commit(&self, reference: &str) -> Result<Option<String>> {
        git::resolve_commit(&self.root, reference)
    }

    fn is_detached(&self) -> Result<bool> {
        git::is_detached(&self.root)
    }

    fn current_branch(&self) -> Result<String> {
        git::current_branch(&self.root)
    }

    fn is_dirty(&self) -> Result<bool> {
        git::is_dirty(&self.root)
    }

    fn checkout_path(&self, reference: &str) -> Result<()> {
        git::checkout_path(&self.root, reference)
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        git::checkout(&self.root, reference)
    }

    fn submodule_sync(&self) -> Result<()> {
        git::submodule_sync(&self.root)
    }

    fn submodule_deinit(&self) -> Result<()> {
        git::submodule_deinit(&self.root)
    }

    fn submodule_update(&self) -> Result<()> {
        git::submodule_update(&self.root)
    }
}

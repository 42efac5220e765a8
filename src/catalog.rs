//! # Version Catalog
//!
//! Enumerates everything that can be built: tags first, then the branches of
//! the tracked remote, then (with `--force` on a detached `HEAD`) the
//! detached commit itself.
//!
//! Loading the catalog is also the startup gate. A repository without any
//! commit, or with uncommitted modifications to tracked files, is rejected
//! before anything is checked out: every checkout is forced and would
//! silently discard those modifications.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::repository::VersionControl;
use crate::version::Version;

/// All versions known to the repository, with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    versions: Vec<Version>,
    lookup: HashMap<String, usize>,
}

impl VersionCatalog {
    /// Validate the repository and enumerate its versions.
    pub fn load(vcs: &dyn VersionControl, force: bool) -> Result<Self> {
        if vcs.is_dirty()? {
            return Err(Error::RepositoryState {
                path: vcs.root().to_path_buf(),
                message: "uncommitted changes exist in the repository".to_string(),
                hint: Some(
                    "Commit or stash them; versions are checked out with --force".to_string(),
                ),
            });
        }
        let catalog = Self::enumerate(vcs, force)?;
        info!("latched into the git repo at {}", vcs.root().display());
        Ok(catalog)
    }

    /// Enumerate versions without the uncommitted-changes check.
    ///
    /// Only suitable for read-only use such as listing.
    pub fn enumerate(vcs: &dyn VersionControl, force: bool) -> Result<Self> {
        let Some(head) = vcs.head_commit()? else {
            return Err(Error::RepositoryState {
                path: vcs.root().to_path_buf(),
                message: "the repository has no commits".to_string(),
                hint: Some("Add some commits then try again".to_string()),
            });
        };

        let mut versions = vcs.tags()?;
        versions.extend(vcs.remote_branches()?);

        if vcs.is_detached()? {
            warn!("git HEAD is detached at {}", head);
            if force {
                debug!("forcing detached commit {} into the catalog", head);
                versions.push(Version::detached(&head));
            }
        }

        let catalog = Self::from_versions(versions);
        debug!("found versions: {:?}", catalog.names().collect::<Vec<_>>());
        Ok(catalog)
    }

    /// Build a catalog from an already enumerated list.
    ///
    /// Names must be unique across kinds since each one owns an output
    /// directory. When two versions share a name (a tag and a branch both
    /// called `stable`) the one listed last replaces the earlier one, with a
    /// warning.
    pub fn from_versions(versions: Vec<Version>) -> Self {
        let mut slots: Vec<Option<Version>> = Vec::with_capacity(versions.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for version in versions {
            if let Some(&earlier) = positions.get(&version.name) {
                if let Some(shadowed) = slots[earlier].take() {
                    warn!(
                        "{} `{}` and {} `{}` share a name; only the {} is built",
                        shadowed.kind, shadowed.name, version.kind, version.name, version.kind
                    );
                }
            }
            positions.insert(version.name.clone(), slots.len());
            slots.push(Some(version));
        }

        let versions: Vec<Version> = slots.into_iter().flatten().collect();
        let lookup = versions
            .iter()
            .enumerate()
            .map(|(index, version)| (version.name.clone(), index))
            .collect();
        Self { versions, lookup }
    }

    /// Every version in catalog order: tags, branches, detached.
    pub fn all(&self) -> &[Version] {
        &self.versions
    }

    pub fn get(&self, name: &str) -> Option<&Version> {
        self.lookup.get(name).map(|&index| &self.versions[index])
    }

    /// Version names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(|v| v.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

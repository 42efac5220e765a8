//! # Checkout Controller
//!
//! The working tree is one shared mutable resource. This controller is its
//! only writer: it checks out a version, brings submodules in line with it,
//! and remembers what it last checked out so the orchestration can put the
//! original version back when a phase ends.
//!
//! ## Checkout protocol
//!
//! 1. Tags are checked out by path with `--force --recurse-submodules`;
//!    branches and commits with a plain forced checkout.
//! 2. `submodule sync --recursive`, then `submodule deinit --all --force` to
//!    drop submodules the new version no longer references. Failures here
//!    are logged and tolerated.
//! 3. `submodule update --init --recursive --force`. A failure here is
//!    fatal: documentation cannot be built from an inconsistent tree.
//!
//! Methods take `&mut self`, so the borrow checker already rules out two
//! overlapping checkouts through the same controller.

use log::{debug, error, warn};

use crate::error::{Error, Result};
use crate::repository::VersionControl;
use crate::version::Version;

pub struct CheckoutController<'a> {
    vcs: &'a dyn VersionControl,
    active: Option<Version>,
    checkouts: usize,
}

impl<'a> CheckoutController<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self {
            vcs,
            active: None,
            checkouts: 0,
        }
    }

    /// Check out `target` and synchronize submodules.
    pub fn checkout(&mut self, target: &Version) -> Result<()> {
        debug!("git checkout {} `{}`", target.kind, target.reference);
        self.checkouts += 1;

        if target.is_tag() {
            self.vcs.checkout_path(&target.reference)?;
        } else {
            self.vcs.checkout(&target.reference)?;
        }
        self.active = Some(target.clone());

        if let Err(e) = self
            .vcs
            .submodule_sync()
            .and_then(|()| self.vcs.submodule_deinit())
        {
            let warning = Error::NestedComponentSync {
                version: target.name.clone(),
                message: e.to_string(),
            };
            warn!("{}", warning);
        }

        self.vcs.submodule_update().map_err(|e| {
            let fatal = Error::NestedComponentUpdate {
                version: target.name.clone(),
                message: e.to_string(),
            };
            error!("{}", fatal);
            fatal
        })?;

        debug!("submodules successfully updated");
        Ok(())
    }

    /// Number of checkouts attempted so far, failed ones included.
    pub fn checkouts(&self) -> usize {
        self.checkouts
    }

    /// Commit currently checked out.
    pub fn head_commit(&self) -> Result<Option<String>> {
        self.vcs.head_commit()
    }

    /// The version currently in the working tree.
    ///
    /// Prefers what this controller checked out; otherwise asks the
    /// repository, wrapping a detached `HEAD` as a detached version.
    pub fn active_version(&self) -> Result<Version> {
        if let Some(active) = &self.active {
            return Ok(active.clone());
        }

        let head = self.vcs.head_commit()?.unwrap_or_default();
        if self.vcs.is_detached()? {
            warn!("git HEAD is detached at {}", head);
            return Ok(Version::detached(&head));
        }

        let branch = self.vcs.current_branch()?;
        Ok(Version::local_branch(&branch, &head))
    }
}

//! # Versioned Documentation Builder
//!
//! This library builds several versions (tags and branches) of a Sphinx
//! documentation tree out of one git repository into a single output tree,
//! one subdirectory per version. It is used by the `versioned-docs`
//! command-line tool.
//!
//! Rendering is left to `sphinx-build`. The library does the orchestration
//! around it: choosing versions, checking each one out in the shared working
//! tree, reusing earlier builds when their commit has not changed, and
//! putting the working tree back the way it was when the run ends.
//!
//! ## Quick Example
//!
//! ```
//! use versioned_docs::catalog::VersionCatalog;
//! use versioned_docs::selection::Selector;
//! use versioned_docs::version::Version;
//!
//! let catalog = VersionCatalog::from_versions(vec![
//!     Version::tag("v1.0", "1111111"),
//!     Version::remote_branch("origin", "main", "2222222"),
//!     Version::remote_branch("origin", "release-1", "3333333"),
//! ]);
//!
//! let selector = Selector::new(&["release-*".to_string()], &[], Some("v"), false).unwrap();
//! let names: Vec<_> = selector
//!     .resolve(&catalog)
//!     .into_iter()
//!     .map(|v| v.name)
//!     .collect();
//! assert_eq!(names, vec!["release-1", "v1.0"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Versions (`version`, `catalog`)**: every tag and remote branch, plus
//!   the detached `HEAD` when forced.
//! - **Selection (`selection`)**: include globs, an anchored regex and
//!   exclude globs turned into the ordered build set.
//! - **Working tree (`repository`, `git`, `checkout`)**: the version-control
//!   collaborator behind a trait, and the single writer of the working tree.
//! - **Cache (`cache`, `filesystem`)**: per-version output directories
//!   stamped with the commit they were built from.
//! - **Builder (`builder`)**: the external tool behind a trait.
//! - **Phases (`phases`)**: pre-build, real build and aggregation.
//!
//! ## Execution Flow
//!
//! The main entry point is `phases::orchestrator::execute`:
//!
//! 1.  **Plan**: validate the repository, load the catalog and resolve the
//!     selection. Nothing is modified yet.
//! 2.  **Pre-build**: build every selected version plainly into a scratch
//!     directory and drop the ones that fail.
//! 3.  **Build**: build the survivors with the version selector, reusing
//!     cached output where the commit is unchanged.
//! 4.  **Aggregate**: write the redirect page and the navigation manifest.

pub mod builder;
pub mod cache;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod output;
pub mod phases;
pub mod repository;
pub mod selection;
pub mod version;

#[cfg(test)]
mod selection_proptest;
#[cfg(test)]
mod test_support;

//! # Version Selection
//!
//! Turns the user's include globs, exclude globs and optional regex into the
//! ordered list of versions to build.
//!
//! - No include globs and no regex: every catalog version, unchanged.
//! - Include globs use shell-glob semantics (`*` also matches `/`) against
//!   catalog names. A glob matching nothing is reported and skipped, or with
//!   `force` turned into a pseudo version so an unlisted reference (a commit
//!   hash, a local-only branch) can still be built.
//! - The regex matches at the start of a name, like `release-\d+` against
//!   `release-2-hotfix`, and all matches are appended.
//! - Exclude globs are applied once, to the whole union, including forced
//!   pseudo versions.
//!
//! The result keeps first-seen order and contains each name once.

use std::collections::HashSet;

use glob::Pattern;
use log::{debug, info, warn};
use regex::Regex;

use crate::catalog::VersionCatalog;
use crate::error::{Error, Result};
use crate::version::Version;

/// Compiled selection request.
#[derive(Debug, Clone)]
pub struct Selector {
    include: Vec<(String, Pattern)>,
    exclude: Vec<Pattern>,
    regex: Option<Regex>,
    force_unknown: bool,
}

impl Selector {
    /// Compile all patterns up front so a typo fails before any checkout.
    pub fn new(
        include: &[String],
        exclude: &[String],
        regex: Option<&str>,
        force_unknown: bool,
    ) -> Result<Self> {
        let include = include
            .iter()
            .map(|p| Ok((p.clone(), Pattern::new(p)?)))
            .collect::<Result<Vec<_>>>()?;
        let exclude = exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(Error::Glob))
            .collect::<Result<Vec<_>>>()?;
        let regex = regex
            .map(|r| Regex::new(&format!("^(?:{})", r)))
            .transpose()?;

        Ok(Self {
            include,
            exclude,
            regex,
            force_unknown,
        })
    }

    /// Whether `name` matches one of the exclude globs.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(name))
    }

    /// Resolve against `catalog` into the ordered build set.
    pub fn resolve(&self, catalog: &VersionCatalog) -> Vec<Version> {
        debug!(
            "instructions to select: {:?}",
            self.include.iter().map(|(raw, _)| raw).collect::<Vec<_>>()
        );

        let selected = if self.include.is_empty() && self.regex.is_none() {
            catalog.all().to_vec()
        } else {
            self.select(catalog)
        };

        let mut seen = HashSet::new();
        let result: Vec<Version> = selected
            .into_iter()
            .filter(|v| seen.insert(v.name.clone()))
            .filter(|v| {
                let excluded = self.is_excluded(&v.name);
                if excluded {
                    debug!("excluding {}", v.name);
                }
                !excluded
            })
            .collect();

        info!(
            "selected versions: {:?}",
            result.iter().map(|v| v.name.as_str()).collect::<Vec<_>>()
        );
        result
    }

    fn select(&self, catalog: &VersionCatalog) -> Vec<Version> {
        let mut selected = Vec::new();

        for (raw, pattern) in &self.include {
            let matches: Vec<&Version> = catalog
                .names()
                .filter(|name| pattern.matches(name))
                .filter_map(|name| catalog.get(name))
                .collect();

            if !matches.is_empty() {
                selected.extend(matches.into_iter().cloned());
            } else if self.force_unknown {
                warn!(
                    "Forcing build for `{}`, be careful, it may or may not exist!",
                    raw
                );
                selected.push(Version::pseudo(raw, None));
            } else {
                warn!("{}", Error::Selection { pattern: raw.clone() });
            }
        }

        if let Some(regex) = &self.regex {
            let matched: Vec<&Version> = catalog
                .names()
                .filter(|name| regex.is_match(name))
                .filter_map(|name| catalog.get(name))
                .collect();
            debug!(
                "matched with regex: {:?}",
                matched.iter().map(|v| v.name.as_str()).collect::<Vec<_>>()
            );
            selected.extend(matched.into_iter().cloned());
        }

        selected
    }
}

//! Result aggregation
//!
//! Turns the versions that were built into the metadata of the output tree:
//!
//! - `index.html` at the output root, redirecting to the main version. When
//!   the main version was not built this is a loud warning and no redirect
//!   page is written.
//! - `versions.json`, the navigation manifest consumed by the documentation
//!   theme: tags and branches, each entry pointing at its `index.html`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::defaults::VERSIONS_MANIFEST;
use crate::error::{Error, Result};
use crate::phases::BuildResult;
use crate::version::VersionKind;

/// One navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub name: String,
    /// Relative to the output root.
    pub path: String,
}

/// Built versions partitioned for the version selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub tags: Vec<NavigationEntry>,
    /// Branches and detached versions.
    pub branches: Vec<NavigationEntry>,
}

impl Navigation {
    pub fn len(&self) -> usize {
        self.tags.len() + self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the relative path of `name`.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .chain(self.branches.iter())
            .find(|entry| entry.name == name)
            .map(|entry| entry.path.as_str())
    }
}

/// Product of the aggregation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Relative URL the top-level page redirects to, if it was written.
    pub redirect_target: Option<String>,
    pub navigation: Navigation,
    /// Names of the built versions, in build order.
    pub built: Vec<String>,
}

/// Collect the successful results and write the output-root metadata.
pub fn execute(results: &[BuildResult], output_root: &Path, main_version: &str) -> Result<Summary> {
    let navigation = navigation(results);
    let built: Vec<String> = results
        .iter()
        .filter(|r| r.succeeded())
        .map(|r| r.version.name.clone())
        .collect();

    fs::create_dir_all(output_root)?;

    let redirect_target = match navigation.path_of(main_version) {
        Some(target) => {
            write_redirect(output_root, target)?;
            Some(target.to_string())
        }
        None => {
            warn!(
                "{}",
                Error::MainVersionMissing {
                    name: main_version.to_string()
                }
            );
            None
        }
    };

    let manifest = output_root.join(VERSIONS_MANIFEST);
    fs::write(&manifest, serde_json::to_string_pretty(&navigation)?)?;
    info!(
        "wrote navigation for {} versions to {}",
        navigation.len(),
        manifest.display()
    );

    Ok(Summary {
        redirect_target,
        navigation,
        built,
    })
}

/// Navigation entries of the successful results, in build order.
pub fn navigation(results: &[BuildResult]) -> Navigation {
    let mut navigation = Navigation::default();
    for result in results.iter().filter(|r| r.succeeded()) {
        let entry = NavigationEntry {
            name: result.version.name.clone(),
            path: format!("{}/index.html", result.version.dir_name()),
        };
        match result.version.kind {
            VersionKind::Tag => navigation.tags.push(entry),
            VersionKind::Branch | VersionKind::Detached => navigation.branches.push(entry),
        }
    }
    navigation
}

/// Page sending browsers at the root of the output tree to `target`.
///
/// Each path segment is percent-encoded, so quotes, angle brackets and
/// ampersands from ref names never reach the markup raw.
pub fn redirect_page(target: &str) -> String {
    let target = target
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    \
         <meta http-equiv=\"refresh\" content=\"0; url={target}\">\n    \
         <link rel=\"canonical\" href=\"{target}\">\n  </head>\n  <body>\n    \
         <p>Redirecting to <a href=\"{target}\">{target}</a>.</p>\n  </body>\n</html>\n"
    )
}

fn write_redirect(output_root: &Path, target: &str) -> Result<PathBuf> {
    let page = output_root.join("index.html");
    fs::write(&page, redirect_page(target))?;
    info!("redirecting {} to {}", page.display(), target);
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::BuildState;
    use crate::version::Version;
    use tempfile::TempDir;

    fn built(version: Version, root: &Path) -> BuildResult {
        let path = root.join(version.dir_name());
        BuildResult::new(version, BuildState::Built, path)
    }

    #[test]
    fn test_tag_and_branch_with_redirect() {
        let dir = TempDir::new().unwrap();
        let results = vec![
            built(Version::tag("v1.0", "t1"), dir.path()),
            built(Version::remote_branch("origin", "main", "b1"), dir.path()),
        ];

        let summary = execute(&results, dir.path(), "main").unwrap();

        assert_eq!(summary.redirect_target.as_deref(), Some("main/index.html"));
        assert_eq!(
            summary.navigation.tags,
            vec![NavigationEntry {
                name: "v1.0".to_string(),
                path: "v1.0/index.html".to_string()
            }]
        );
        assert_eq!(
            summary.navigation.branches,
            vec![NavigationEntry {
                name: "main".to_string(),
                path: "main/index.html".to_string()
            }]
        );
        assert_eq!(summary.built, vec!["v1.0", "main"]);

        let page = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(page.contains("content=\"0; url=main/index.html\""));
    }

    #[test]
    fn test_manifest_is_written() {
        let dir = TempDir::new().unwrap();
        let results = vec![built(Version::tag("v1.0", "t1"), dir.path())];

        execute(&results, dir.path(), "v1.0").unwrap();

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(VERSIONS_MANIFEST)).unwrap())
                .unwrap();
        assert_eq!(manifest["tags"][0]["name"], "v1.0");
        assert_eq!(manifest["tags"][0]["path"], "v1.0/index.html");
        assert_eq!(manifest["branches"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_main_version_warns_without_redirect() {
        testing_logger::setup();
        let dir = TempDir::new().unwrap();
        let results = vec![built(Version::tag("v1.0", "t1"), dir.path())];

        let summary = execute(&results, dir.path(), "main").unwrap();

        assert!(summary.redirect_target.is_none());
        assert!(!dir.path().join("index.html").exists());
        testing_logger::validate(|logs| {
            assert!(logs.iter().any(|l| l.level == log::Level::Warn
                && l.body.contains("Main version `main` was not built")));
        });
    }

    #[test]
    fn test_failed_results_are_left_out() {
        let dir = TempDir::new().unwrap();
        let results = vec![
            built(Version::remote_branch("origin", "main", "b1"), dir.path()),
            BuildResult::new(
                Version::remote_branch("origin", "dev", "b2"),
                BuildState::BuildFailed,
                dir.path().join("dev"),
            ),
        ];

        let navigation = navigation(&results);
        assert_eq!(navigation.len(), 1);
        assert!(navigation.path_of("dev").is_none());
    }

    #[test]
    fn test_redirect_page_encodes_markup_characters() {
        let page = redirect_page("a\"b<c>&d/index.html");

        assert!(page.contains("url=a%22b%3Cc%3E%26d/index.html\""));
        assert!(page.contains("href=\"a%22b%3Cc%3E%26d/index.html\""));
        assert!(!page.contains("a\"b"));
        assert!(!page.contains("<c>"));
        assert!(!page.contains("&d"));
    }

    #[test]
    fn test_redirect_page_keeps_plain_paths() {
        let page = redirect_page("release-1.x/index.html");
        assert!(page.contains("content=\"0; url=release-1.x/index.html\""));
    }

    #[test]
    fn test_redirect_uses_sanitized_directory() {
        let dir = TempDir::new().unwrap();
        let results = vec![built(
            Version::remote_branch("origin", "release/2.x", "b1"),
            dir.path(),
        )];

        let summary = execute(&results, dir.path(), "release/2.x").unwrap();
        assert_eq!(
            summary.redirect_target.as_deref(),
            Some("release_2.x/index.html")
        );
    }
}

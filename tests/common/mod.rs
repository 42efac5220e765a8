//! Shared test utilities for the E2E tests.
//!
//! [`GitFixture`] builds a throwaway repository the way a documentation
//! project looks in practice: an upstream repository with tags and branches,
//! and a clone of it (so branches appear under `origin/`) to build from.
//! A small shell script stands in for `sphinx-build`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = GitFixture::new();
//! let mut cmd = cargo_bin_cmd!("versioned-docs");
//! fixture.build_command(&mut cmd).assert().success();
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::GitFixture;
}

/// Stand-in for `sphinx-build`.
///
/// Writes an `index.html` naming the version being built and appends one
/// line per invocation to `$STUB_LOG`. Fails when the source directory holds
/// a `BROKEN` file, or a `BROKEN_REAL` file during a customized build.
const STUB_BUILDER: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "sphinx-build 7.2.6"
    exit 0
fi
src=""
dest=""
for arg in "$@"; do
    src="$dest"
    dest="$arg"
done
version="${VERSIONED_DOCS_CURRENT_VERSION:-}"
if [ -n "$STUB_LOG" ]; then
    echo "${version:-prebuild}" >> "$STUB_LOG"
fi
if [ -f "$src/BROKEN" ]; then
    echo "build broken" >&2
    exit 1
fi
if [ -n "$version" ] && [ -f "$src/BROKEN_REAL" ]; then
    echo "real build broken" >&2
    exit 3
fi
mkdir -p "$dest"
echo "<p>${version:-plain}</p>" > "$dest/index.html"
"#;

/// Upstream repository, working clone, stub builder and output directory.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl GitFixture {
    /// Upstream history:
    ///
    /// - `v1.0`: first commit, tagged
    /// - `main`: second commit
    /// - `release-1`: branch off `main` with a third commit
    ///
    /// The working clone is on `main`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let upstream = temp_dir.path().join("upstream");
        fs::create_dir_all(upstream.join("docs")).unwrap();

        git(&upstream, &["init", "-q"]);
        git(&upstream, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        fs::write(upstream.join("docs/conf.py"), "project = 'demo'\n").unwrap();
        fs::write(upstream.join("docs/index.rst"), "Version one\n").unwrap();
        commit_all(&upstream, "first");
        git(&upstream, &["tag", "-a", "v1.0", "-m", "release 1.0"]);

        fs::write(upstream.join("docs/index.rst"), "Main line\n").unwrap();
        commit_all(&upstream, "second");

        git(&upstream, &["checkout", "-q", "-b", "release-1"]);
        fs::write(upstream.join("docs/index.rst"), "Release one\n").unwrap();
        commit_all(&upstream, "third");
        git(&upstream, &["checkout", "-q", "main"]);

        git(temp_dir.path(), &["clone", "-q", "upstream", "work"]);

        let fixture = Self { temp_dir };
        fs::write(fixture.stub_path(), STUB_BUILDER).unwrap();
        make_executable(&fixture.stub_path());
        fixture
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn upstream(&self) -> PathBuf {
        self.root().join("upstream")
    }

    /// The clone builds run in.
    pub fn work(&self) -> PathBuf {
        self.root().join("work")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("site")
    }

    pub fn stub_path(&self) -> PathBuf {
        self.root().join("sphinx-stub.sh")
    }

    pub fn stub_log(&self) -> PathBuf {
        self.root().join("stub.log")
    }

    /// Lines of the stub log: a version name per customized build,
    /// `prebuild` per pre-build.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.stub_log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn clear_invocations(&self) {
        let _ = fs::remove_file(self.stub_log());
    }

    /// Commit a file on an upstream branch and fetch it into the clone.
    pub fn commit_upstream(&self, branch: &str, path: &str, content: &str) {
        let upstream = self.upstream();
        git(&upstream, &["checkout", "-q", branch]);
        let file = upstream.join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
        commit_all(&upstream, &format!("update {}", path));
        git(&upstream, &["checkout", "-q", "main"]);
        git(&self.work(), &["fetch", "-q", "origin"]);
    }

    /// Branch `HEAD` of the clone is attached to.
    pub fn current_branch(&self) -> String {
        git(&self.work(), &["symbolic-ref", "--short", "HEAD"])
    }

    /// Point `cmd` at the clone, the stub builder and the output directory.
    pub fn build_command<'a>(
        &self,
        cmd: &'a mut assert_cmd::Command,
    ) -> &'a mut assert_cmd::Command {
        cmd.current_dir(self.work())
            .env("STUB_LOG", self.stub_log())
            .env_remove("VERSIONED_DOCS_CONFIG")
            .env_remove("VERSIONED_DOCS_CACHE")
            .arg("--color")
            .arg("never")
            .arg("build")
            .arg("--sphinx-build")
            .arg(self.stub_path())
            .arg("--output")
            .arg(self.output())
    }
}

/// Run git in `dir`, panicking on failure; returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=Docs Test",
            "-c",
            "user.email=docs@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", message]);
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

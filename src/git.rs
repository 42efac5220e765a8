//! Thin wrappers around the system `git` command.
//!
//! Every function runs one blocking `git` invocation inside the repository
//! and maps a non-zero exit status to [`Error::GitCommand`] carrying stderr.
//! Using the system binary means submodule URLs, credentials and
//! `~/.gitconfig` behave exactly as they do for the user.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Error, Result};

fn spawn(repo: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            path: repo.to_path_buf(),
            stderr: e.to_string(),
        })
}

/// Run `git <args>` in `repo` and return stdout with trailing whitespace removed.
pub fn run(repo: &Path, args: &[&str]) -> Result<String> {
    let output = spawn(repo, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            path: repo.to_path_buf(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Run `git <args>` and report only whether it exited successfully.
fn probe(repo: &Path, args: &[&str]) -> Result<bool> {
    Ok(spawn(repo, args)?.status.success())
}

/// Resolve the top-level directory of the work tree containing `path`.
pub fn toplevel(path: &Path) -> Result<PathBuf> {
    run(path, &["rev-parse", "--show-toplevel"]).map(PathBuf::from)
}

/// List tags as `(name, commit)`, annotated tags peeled to their commit.
pub fn list_tags(repo: &Path) -> Result<Vec<(String, String)>> {
    let stdout = run(
        repo,
        &[
            "for-each-ref",
            "--format=%(refname:strip=2)%09%(objectname)%09%(*objectname)",
            "refs/tags",
        ],
    )?;
    Ok(parse_tag_refs(&stdout))
}

/// List the branches of `remote` as `(name, commit)`, without the remote prefix.
pub fn list_remote_branches(repo: &Path, remote: &str) -> Result<Vec<(String, String)>> {
    let pattern = format!("refs/remotes/{}", remote);
    let stdout = run(
        repo,
        &[
            "for-each-ref",
            "--format=%(refname:strip=3)%09%(objectname)",
            &pattern,
        ],
    )?;
    Ok(parse_branch_refs(&stdout))
}

/// Commit hash of `HEAD`, or `None` when the repository has no commits yet.
pub fn head_commit(repo: &Path) -> Result<Option<String>> {
    resolve_commit(repo, "HEAD")
}

/// Resolve any reference to the commit it points at.
pub fn resolve_commit(repo: &Path, reference: &str) -> Result<Option<String>> {
    let spec = format!("{}^{{commit}}", reference);
    let output = spawn(repo, &["rev-parse", "--verify", "--quiet", &spec])?;
    if !output.status.success() {
        return Ok(None);
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Some(hash).filter(|h| !h.is_empty()))
}

/// Whether `HEAD` points directly at a commit instead of a branch.
pub fn is_detached(repo: &Path) -> Result<bool> {
    probe(repo, &["symbolic-ref", "--quiet", "HEAD"]).map(|attached| !attached)
}

/// Short name of the branch `HEAD` is attached to.
pub fn current_branch(repo: &Path) -> Result<String> {
    run(repo, &["symbolic-ref", "--short", "HEAD"])
}

/// Whether tracked files have uncommitted modifications (untracked files are ignored).
pub fn is_dirty(repo: &Path) -> Result<bool> {
    let stdout = run(repo, &["status", "--porcelain", "--untracked-files=no"])?;
    Ok(!stdout.trim().is_empty())
}

/// `git checkout <path> --force --recurse-submodules`, used for tags.
pub fn checkout_path(repo: &Path, reference: &str) -> Result<()> {
    run(
        repo,
        &["checkout", reference, "--force", "--recurse-submodules"],
    )
    .map(drop)
}

/// `git checkout --force <reference>`, used for branches and commits.
pub fn checkout(repo: &Path, reference: &str) -> Result<()> {
    run(repo, &["checkout", "--force", reference]).map(drop)
}

pub fn submodule_sync(repo: &Path) -> Result<()> {
    run(repo, &["submodule", "sync", "--recursive"]).map(drop)
}

pub fn submodule_deinit(repo: &Path) -> Result<()> {
    run(repo, &["submodule", "deinit", "--all", "--force"]).map(drop)
}

pub fn submodule_update(repo: &Path) -> Result<()> {
    run(
        repo,
        &["submodule", "update", "--init", "--recursive", "--force"],
    )
    .map(drop)
}

/// Parse `for-each-ref` tag lines: `<name>\t<object>\t<peeled>`.
///
/// Lightweight tags have an empty peeled column and point at the commit
/// directly.
pub fn parse_tag_refs(stdout: &str) -> Vec<(String, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let name = parts.next()?.trim();
            let object = parts.next()?.trim();
            let peeled = parts.next().unwrap_or("").trim();
            if name.is_empty() || object.is_empty() {
                return None;
            }
            let commit = if peeled.is_empty() { object } else { peeled };
            Some((name.to_string(), commit.to_string()))
        })
        .collect()
}

/// Parse `for-each-ref` remote branch lines: `<name>\t<commit>`.
///
/// The remote's symbolic `HEAD` is not a branch and is skipped.
pub fn parse_branch_refs(stdout: &str) -> Vec<(String, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, commit) = line.split_once('\t')?;
            let name = name.trim();
            if name.is_empty() || name == "HEAD" {
                return None;
            }
            Some((name.to_string(), commit.trim().to_string()))
        })
        .collect()
}

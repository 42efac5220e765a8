//! In-memory stand-ins for the repository and the document builder.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::builder::{BuildStatus, BuildTool, Invocation};
use crate::config::{BuildConfig, Settings};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::repository::VersionControl;
use crate::version::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Branch { name: String, commit: String },
    Detached { reference: String, commit: String },
}

#[derive(Debug)]
struct RepoState {
    head: Head,
    calls: Vec<String>,
}

/// Fake [`VersionControl`] recording every mutating call.
pub struct FakeRepo {
    root: PathBuf,
    tags: Vec<Version>,
    branches: Vec<Version>,
    local_branches: HashMap<String, String>,
    extra_commits: HashMap<String, String>,
    dirty: bool,
    empty: bool,
    fail_sync: bool,
    fail_update_for: HashSet<String>,
    state: Mutex<RepoState>,
}

impl FakeRepo {
    /// A repository on local branch `main` at commit `head0`.
    pub fn new() -> Self {
        let mut local_branches = HashMap::new();
        local_branches.insert("main".to_string(), "head0".to_string());
        Self {
            root: PathBuf::from("/fake/repo"),
            tags: Vec::new(),
            branches: Vec::new(),
            local_branches,
            extra_commits: HashMap::new(),
            dirty: false,
            empty: false,
            fail_sync: false,
            fail_update_for: HashSet::new(),
            state: Mutex::new(RepoState {
                head: Head::Branch {
                    name: "main".to_string(),
                    commit: "head0".to_string(),
                },
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_tag(mut self, name: &str, commit: &str) -> Self {
        self.tags.push(Version::tag(name, commit));
        self
    }

    pub fn with_remote_branch(mut self, name: &str, commit: &str) -> Self {
        self.branches
            .push(Version::remote_branch("origin", name, commit));
        self
    }

    /// Make `reference` resolvable without listing it anywhere.
    pub fn with_commit(mut self, reference: &str, commit: &str) -> Self {
        self.extra_commits
            .insert(reference.to_string(), commit.to_string());
        self
    }

    pub fn on_branch(mut self, name: &str, commit: &str) -> Self {
        self.local_branches
            .insert(name.to_string(), commit.to_string());
        self.state.get_mut().unwrap().head = Head::Branch {
            name: name.to_string(),
            commit: commit.to_string(),
        };
        self
    }

    pub fn detached_at(mut self, commit: &str) -> Self {
        self.extra_commits
            .insert(commit.to_string(), commit.to_string());
        self.state.get_mut().unwrap().head = Head::Detached {
            reference: commit.to_string(),
            commit: commit.to_string(),
        };
        self
    }

    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub fn without_history(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn failing_submodule_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    pub fn failing_submodule_update_for(mut self, reference: &str) -> Self {
        self.fail_update_for.insert(reference.to_string());
        self
    }

    /// Mutating calls in order, e.g. `checkout origin/main`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of checkouts of the main tree (not counting submodule calls).
    pub fn checkout_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("checkout"))
            .count()
    }

    /// What `HEAD` currently points at: a branch name or a detached reference.
    pub fn head_reference(&self) -> String {
        match &self.state.lock().unwrap().head {
            Head::Branch { name, .. } => name.clone(),
            Head::Detached { reference, .. } => reference.clone(),
        }
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn lookup(&self, reference: &str) -> Option<String> {
        self.tags
            .iter()
            .chain(self.branches.iter())
            .find(|v| v.reference == reference)
            .and_then(|v| v.commit.clone())
            .or_else(|| self.local_branches.get(reference).cloned())
            .or_else(|| self.extra_commits.get(reference).cloned())
    }

    fn switch(&self, reference: &str) -> Result<()> {
        let Some(commit) = self.lookup(reference) else {
            return Err(Error::GitCommand {
                command: format!("checkout {}", reference),
                path: self.root.clone(),
                stderr: format!("error: pathspec '{}' did not match", reference),
            });
        };
        let head = if self.local_branches.contains_key(reference) {
            Head::Branch {
                name: reference.to_string(),
                commit,
            }
        } else {
            Head::Detached {
                reference: reference.to_string(),
                commit,
            }
        };
        self.state.lock().unwrap().head = head;
        Ok(())
    }

    fn fail(&self, command: &str) -> Error {
        Error::GitCommand {
            command: command.to_string(),
            path: self.root.clone(),
            stderr: "fatal: simulated failure".to_string(),
        }
    }
}

impl VersionControl for FakeRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn tags(&self) -> Result<Vec<Version>> {
        Ok(self.tags.clone())
    }

    fn remote_branches(&self) -> Result<Vec<Version>> {
        Ok(self.branches.clone())
    }

    fn head_commit(&self) -> Result<Option<String>> {
        if self.empty {
            return Ok(None);
        }
        Ok(Some(match &self.state.lock().unwrap().head {
            Head::Branch { commit, .. } | Head::Detached { commit, .. } => commit.clone(),
        }))
    }

    fn resolve_commit(&self, reference: &str) -> Result<Option<String>> {
        Ok(self.lookup(reference))
    }

    fn is_detached(&self) -> Result<bool> {
        Ok(matches!(
            self.state.lock().unwrap().head,
            Head::Detached { .. }
        ))
    }

    fn current_branch(&self) -> Result<String> {
        match &self.state.lock().unwrap().head {
            Head::Branch { name, .. } => Ok(name.clone()),
            Head::Detached { .. } => Err(self.fail("symbolic-ref --short HEAD")),
        }
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn checkout_path(&self, reference: &str) -> Result<()> {
        self.record(format!("checkout-path {}", reference));
        self.switch(reference)
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        self.record(format!("checkout {}", reference));
        self.switch(reference)
    }

    fn submodule_sync(&self) -> Result<()> {
        self.record("submodule sync".to_string());
        if self.fail_sync {
            return Err(self.fail("submodule sync --recursive"));
        }
        Ok(())
    }

    fn submodule_deinit(&self) -> Result<()> {
        self.record("submodule deinit".to_string());
        Ok(())
    }

    fn submodule_update(&self) -> Result<()> {
        self.record("submodule update".to_string());
        if self.fail_update_for.contains(&self.head_reference()) {
            return Err(self.fail("submodule update --init --recursive --force"));
        }
        Ok(())
    }
}

/// One recorded call to [`FakeTool`].
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub version: String,
    /// Whether build options (flyout customization) were passed.
    pub customized: bool,
    /// Files already present in the destination when the tool started.
    pub preexisting: Vec<PathBuf>,
}

/// Fake [`BuildTool`] writing a one-page site into the destination.
#[derive(Default)]
pub struct FakeTool {
    failing: HashSet<String>,
    failing_customized: HashSet<String>,
    calls: Mutex<Vec<ToolCall>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every build of `version`.
    pub fn failing(mut self, version: &str) -> Self {
        self.failing.insert(version.to_string());
        self
    }

    /// Fail only the customized (real) build of `version`.
    pub fn failing_real_build(mut self, version: &str) -> Self {
        self.failing_customized.insert(version.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of versions built with customization, in order.
    pub fn real_builds(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.customized)
            .map(|c| c.version)
            .collect()
    }

    /// Names of versions pre-built without customization, in order.
    pub fn prebuilds(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.customized)
            .map(|c| c.version)
            .collect()
    }
}

impl BuildTool for FakeTool {
    fn name(&self) -> &str {
        "fake-builder"
    }

    fn invoke(&self, invocation: &Invocation<'_>) -> Result<BuildStatus> {
        let name = invocation.version.name.clone();
        let customized = invocation.options.is_some();
        self.calls.lock().unwrap().push(ToolCall {
            version: name.clone(),
            customized,
            preexisting: filesystem::list_files(invocation.destination)?,
        });

        if self.failing.contains(&name) || (customized && self.failing_customized.contains(&name)) {
            return Ok(BuildStatus::Failed { code: Some(2) });
        }

        fs::create_dir_all(invocation.destination.join("_static"))?;
        fs::write(
            invocation.destination.join("index.html"),
            format!("<h1>{}</h1>", name),
        )?;
        fs::write(invocation.destination.join("_static/version.txt"), &name)?;
        Ok(BuildStatus::Succeeded)
    }
}

/// Create `docs/conf.py` under `dir` and resolve the default configuration there.
pub fn test_config(dir: &Path) -> BuildConfig {
    fs::create_dir_all(dir.join("docs")).unwrap();
    fs::write(dir.join("docs/conf.py"), "project = 'demo'\n").unwrap();
    Settings::default().resolve(dir).unwrap()
}

//! # External Document Builder
//!
//! Rendering is delegated to an external tool treated as a black box: it
//! receives a source directory and a destination directory and reports
//! success or failure. The orchestrator depends only on the [`BuildTool`]
//! trait.
//!
//! Everything the tool needs to know about the run travels inside the
//! [`Invocation`]: which version is being built and the immutable
//! [`BuildOptions`] of the run. Pre-build invocations carry no options, so
//! the tool renders plain documentation without the version flyout.
//!
//! [`SphinxBuild`] runs `sphinx-build` as a blocking subprocess. The
//! launcher is chosen once at startup: an explicit executable, the
//! `sphinx-build` found on `PATH`, or `python3 -m sphinx`.
//!
//! A single adapter serves every Sphinx release, since the flags it passes
//! (`-Q`, `-vv`, `-A`) are accepted by all of them. Behaviour that does vary
//! between releases, such as the default sidebars, lives in the
//! documentation extension, which receives the probed version in
//! [`ENV_SPHINX_VERSION`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::version::Version;

/// Environment variable carrying the name of the version being built.
pub const ENV_CURRENT_VERSION: &str = "VERSIONED_DOCS_CURRENT_VERSION";
/// Environment variable set to `1` when the floating version badge is requested.
pub const ENV_FLOATING_BADGE: &str = "VERSIONED_DOCS_FLOATING_BADGE";
/// Environment variable set to `1` when the intersphinx mapping should be reset.
pub const ENV_RESET_INTERSPHINX: &str = "VERSIONED_DOCS_RESET_INTERSPHINX";
/// Environment variable carrying the Sphinx version probed at startup.
pub const ENV_SPHINX_VERSION: &str = "VERSIONED_DOCS_SPHINX_VERSION";

/// Cross-cutting options of a run, fixed before the first build starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BuildOptions {
    /// Drop the project's intersphinx mapping while building old versions.
    pub reset_intersphinx_mapping: bool,
    /// Render the version selector as a floating badge instead of in the sidebar.
    pub floating_badge: bool,
}

/// Output flags handed to the tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub quiet: bool,
    pub verbose: bool,
}

/// One request to the external tool.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Directory holding the tool configuration (`conf.py`).
    pub source: &'a Path,
    /// Scratch directory receiving the output.
    pub destination: &'a Path,
    /// Directory the tool runs in.
    pub working_dir: &'a Path,
    /// Version currently checked out.
    pub version: &'a Version,
    pub verbosity: Verbosity,
    /// Version-flyout customization; `None` for pre-builds.
    pub options: Option<&'a BuildOptions>,
}

/// Outcome reported by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Succeeded,
    /// Non-zero exit; `code` is `None` when the tool was killed by a signal.
    Failed { code: Option<i32> },
}

/// Narrow interface to the document builder.
pub trait BuildTool {
    /// Short human-readable name used in log messages.
    fn name(&self) -> &str;

    /// Run one build to completion.
    ///
    /// `Err` means the tool could not be run at all; a build that ran and
    /// failed is `Ok(BuildStatus::Failed { .. })`.
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<BuildStatus>;
}

/// How the Sphinx builder is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// A `sphinx-build` executable.
    Executable(PathBuf),
    /// `<python> -m sphinx`.
    PythonModule(PathBuf),
}

/// [`BuildTool`] running Sphinx in a subprocess.
#[derive(Debug, Clone)]
pub struct SphinxBuild {
    launcher: Launcher,
    version: Option<semver::Version>,
}

impl SphinxBuild {
    pub fn new(launcher: Launcher) -> Self {
        Self {
            launcher,
            version: None,
        }
    }

    /// Pick a launcher and probe the installed Sphinx version.
    pub fn detect(explicit: Option<&Path>) -> Result<Self> {
        let launcher = match explicit {
            Some(path) => Launcher::Executable(path.to_path_buf()),
            None => match which::which("sphinx-build") {
                Ok(path) => Launcher::Executable(path),
                Err(_) => {
                    let python = which::which("python3").map_err(|e| Error::BuildTool {
                        tool: "sphinx-build".to_string(),
                        message: format!("neither sphinx-build nor python3 found on PATH ({})", e),
                    })?;
                    Launcher::PythonModule(python)
                }
            },
        };

        let mut tool = Self::new(launcher);
        tool.version = tool.probe_version();
        match &tool.version {
            Some(version) => info!("using Sphinx {} via {:?}", version, tool.launcher),
            None => debug!("could not determine Sphinx version of {:?}", tool.launcher),
        }
        Ok(tool)
    }

    /// Use a known Sphinx version instead of probing for it.
    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn version(&self) -> Option<&semver::Version> {
        self.version.as_ref()
    }

    fn command(&self) -> Command {
        match &self.launcher {
            Launcher::Executable(path) => Command::new(path),
            Launcher::PythonModule(python) => {
                let mut command = Command::new(python);
                command.args(["-m", "sphinx"]);
                command
            }
        }
    }

    fn probe_version(&self) -> Option<semver::Version> {
        let output = self.command().arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        parse_tool_version(&String::from_utf8_lossy(&output.stdout))
    }

    /// Command-line arguments for one invocation, after the launcher.
    pub fn arguments(invocation: &Invocation<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if invocation.verbosity.quiet {
            args.push("-Q".into());
        }
        if invocation.verbosity.verbose {
            args.push("-vv".into());
        }
        if invocation.options.is_some() {
            args.push("-A".into());
            args.push(format!("current_version={}", invocation.version.name).into());
        }
        args.push(invocation.source.as_os_str().to_owned());
        args.push(invocation.destination.as_os_str().to_owned());
        args
    }

    /// Environment handed to the tool, read by the documentation extension.
    pub fn environment(&self, invocation: &Invocation<'_>) -> Vec<(&'static str, String)> {
        let Some(options) = invocation.options else {
            return Vec::new();
        };
        let mut env = vec![
            (ENV_CURRENT_VERSION, invocation.version.name.clone()),
            (ENV_FLOATING_BADGE, flag(options.floating_badge)),
            (ENV_RESET_INTERSPHINX, flag(options.reset_intersphinx_mapping)),
        ];
        if let Some(version) = &self.version {
            env.push((ENV_SPHINX_VERSION, version.to_string()));
        }
        env
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

impl BuildTool for SphinxBuild {
    fn name(&self) -> &str {
        "sphinx-build"
    }

    fn invoke(&self, invocation: &Invocation<'_>) -> Result<BuildStatus> {
        let mut command = self.command();
        command
            .args(Self::arguments(invocation))
            .current_dir(invocation.working_dir);
        for (key, value) in self.environment(invocation) {
            command.env(key, value);
        }
        debug!("running {:?}", command);

        let status = command.status().map_err(|e| Error::BuildTool {
            tool: self.name().to_string(),
            message: e.to_string(),
        })?;

        if status.success() {
            Ok(BuildStatus::Succeeded)
        } else {
            Ok(BuildStatus::Failed {
                code: status.code(),
            })
        }
    }
}

/// Parse `sphinx-build 7.2.6` style version output.
///
/// Two-component versions (`sphinx-build 1.8`) are padded with a zero patch.
pub fn parse_tool_version(output: &str) -> Option<semver::Version> {
    let token = output.split_whitespace().last()?;
    let token = token.strip_prefix('v').unwrap_or(token);
    if let Ok(version) = semver::Version::parse(token) {
        return Some(version);
    }
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    Some(semver::Version::new(major, minor, 0))
}

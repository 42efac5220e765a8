//! # Error Handling
//!
//! This module defines the centralized error type for `versioned-docs`. It
//! uses `thiserror` to describe every anticipated failure mode of a versioned
//! documentation build with a clear, contextual message.
//!
//! ## Severity
//!
//! Not every variant aborts a run. The orchestration distinguishes:
//!
//! - **Fatal at startup**: `RepositoryState`, `ConfigParse`, `ConfigNotFound`,
//!   `Regex`, `Glob`. Nothing in the working tree has been touched yet.
//! - **Fatal during a phase**: `NestedComponentUpdate`, `ExternalBuild`,
//!   `GitCommand`, `BuildTool`. The phase stops, the originally active version
//!   is checked out again, and the error is returned.
//! - **Reported only**: `Selection`, `NestedComponentSync`,
//!   `MainVersionMissing`. These are built so their message is uniform, logged
//!   as warnings, and never returned from a run.
//!
//! The `Result` alias is used across the library; the binary wraps these
//! errors in `anyhow` at the command layer.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for versioned-docs operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repository cannot be used as a build source.
    ///
    /// Raised for uncommitted changes (every checkout is forced and would
    /// discard them) and for repositories without any commit.
    #[error("Repository state error at {path}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    RepositoryState {
        path: PathBuf,
        message: String,
        /// Optional hint for how to get the repository into a usable state
        hint: Option<String>,
    },

    /// A requested version pattern matched nothing in the catalog.
    #[error("Version not found/selected: `{pattern}`, use `--force` to force the build")]
    Selection { pattern: String },

    /// Best-effort submodule cleanup (sync/deinit) failed.
    #[error("Submodule cleanup failed after checking out {version}: {message}")]
    NestedComponentSync { version: String, message: String },

    /// The forced recursive submodule update failed after a checkout.
    #[error("Submodule update failed after checking out {version}: {message}")]
    NestedComponentUpdate { version: String, message: String },

    /// The external build tool reported failure for a version.
    #[error("Build failed for {version}{}", code.map(|c| format!(" (exit status {})", c)).unwrap_or_default())]
    ExternalBuild { version: String, code: Option<i32> },

    /// The configured main version was not among the built versions.
    #[error("Main version `{name}` was not built; top-level index.html will not be generated")]
    MainVersionMissing { name: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {path}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// The external build tool could not be launched at all.
    #[error("Build tool error: {tool} - {message}")]
    BuildTool { tool: String, message: String },

    /// An error occurred while parsing the configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A path named by the configuration does not exist.
    #[error("{what} not found at {path}")]
    ConfigNotFound { what: String, path: PathBuf },

    /// An error occurred while reading or reusing a cached build.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

//! Default values for versioned-docs configuration.
//!
//! This module provides centralized default values used by the configuration
//! layer and the commands, ensuring consistency and avoiding duplication.

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = ".versioned-docs.yaml";

/// File name of the Sphinx configuration.
pub const CONF_FILE_NAME: &str = "conf.py";

/// Location of the Sphinx configuration relative to the working directory.
pub const DEFAULT_LOCAL_CONF: &str = "docs/conf.py";

/// Output root relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "docs/_build";

/// Remote whose branches are enumerated.
pub const DEFAULT_REMOTE: &str = "origin";

/// Version the top-level `index.html` redirects to.
pub const DEFAULT_MAIN_BRANCH: &str = "main";

/// Navigation manifest written next to the version directories.
pub const VERSIONS_MANIFEST: &str = "versions.json";

//! # Versioned Docs CLI
//!
//! This is the binary entry point for the `versioned-docs` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and terminal output preferences.
//! - Executing the appropriate command and turning library errors into a
//!   non-zero exit status.
//!
//! The orchestration itself lives in the `versioned_docs` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}

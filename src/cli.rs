//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::WriteStyle;

use versioned_docs::output::OutputConfig;

use crate::commands;

/// Versioned Docs - Build every version of your Sphinx documentation
#[derive(Parser, Debug)]
#[command(name = "versioned-docs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the selected versions into the output directory
    Build(commands::build::BuildArgs),

    /// List the versions found in the repository
    List(commands::list::ListArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let output = OutputConfig::from_env_and_flag(&self.color);
        init_logging(self.effective_log_level(), &output);

        match self.command {
            Commands::Build(args) => commands::build::execute(args, &output),
            Commands::List(args) => commands::list::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    /// `--verbose` on `build` raises the level to at least `debug`.
    fn effective_log_level(&self) -> &str {
        match &self.command {
            Commands::Build(args) if args.verbose && !is_trace(&self.log_level) => "debug",
            _ => &self.log_level,
        }
    }
}

fn is_trace(level: &str) -> bool {
    level.eq_ignore_ascii_case("trace")
}

/// Install the global logger. `RUST_LOG`, when set, refines `level`.
fn init_logging(level: &str, output: &OutputConfig) {
    let mut builder = env_logger::Builder::new();
    builder
        .parse_filters(level)
        .format_timestamp(None)
        .format_target(false)
        .write_style(if output.use_color {
            WriteStyle::Always
        } else {
            WriteStyle::Never
        });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A second initialization (as in tests) keeps the first logger.
    let _ = builder.try_init();
}

//! CLI module for reqcat.
//!
//! Commands:
//! - build (default): order, concatenate, write the artifact
//! - order, check, deps, stats: read-only inspection

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "reqcat")]
#[command(version)]
#[command(about = "Concatenate files in `require` dependency order")]
pub struct Cli {
    /// Directory to scan (prompted for when omitted and not in config)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file (default: ./reqcat.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Order, concatenate and write the artifact
    Build {
        /// Artifact path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print the artifact to stdout
        #[arg(long)]
        print: bool,
    },

    /// Print the dependency order without writing anything
    Order {
        #[arg(long)]
        json: bool,
    },

    /// Report cycles and missing files
    Check {
        #[arg(long)]
        json: bool,
    },

    /// Show what a file requires and what requires it
    Deps {
        /// Root-relative file id
        file: String,

        #[arg(long)]
        json: bool,
    },

    /// Show graph statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Build {
            output: None,
            print: false,
        }
    }
}

/// Where the directory to scan comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    Given(PathBuf),
    Prompt,
    CurrentDir,
}

/// Pick the root: command line, then config, then an interactive prompt,
/// then the working directory.
pub fn root_source(cli_root: Option<&Path>, config_root: Option<&Path>, interactive: bool) -> RootSource {
    match cli_root.or(config_root) {
        Some(root) => RootSource::Given(root.to_path_buf()),
        None if interactive => RootSource::Prompt,
        None => RootSource::CurrentDir,
    }
}

/// Tracing filter directive for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

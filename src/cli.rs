//! CLI Argument Parsing
//!
//! Global flags (--config, --project-root, --verbose) are inherited by all
//! subcommands. Running without a subcommand performs the freeze.

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

/// freezepack - freeze a Python Windows application and finish its installer
#[derive(Parser, Debug)]
#[command(name = "freezepack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to freezepack.toml in the project root)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root containing the application sources
    #[arg(long, global = true, default_value = ".")]
    pub project_root: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate the host, stamp the version, and run the freeze tool
    Freeze,

    /// Print the freeze spec as JSON without touching the project
    Plan,

    /// List the locale ids declared by the installer descriptor
    Locales,

    /// Embed per-language transforms into a built installer package
    InstallerLangs {
        /// Installer package to post-process in place
        msi: PathBuf,
    },
}

impl Cli {
    /// Subcommand to run; a bare invocation freezes.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Freeze)
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

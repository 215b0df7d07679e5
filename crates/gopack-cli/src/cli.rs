//! CLI argument parsing using clap.

use clap::Parser;
use clap_complete::Shell;
use gopack_core::config::DEFAULT_VERSION;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gopack")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Drivers: fs, git. Run `gopack <DRIVER> --help` for driver flags.")]
pub struct Cli {
    /// Store the package at this path
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Upload the package to this URL
    #[arg(short = 'u', long = "upload", value_name = "URL")]
    pub upload: Option<String>,

    /// Package version
    #[arg(
        short = 'v',
        long = "pkg-version",
        value_name = "VERSION",
        default_value = DEFAULT_VERSION
    )]
    pub pkg_version: String,

    /// Append a pseudo-version (timestamp and revision) to the version
    #[arg(short = 's', long = "snapshot")]
    pub snapshot: bool,

    /// Include hidden files and directories
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Compression level (0 = store, 1-9 = deflate)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub compression_level: Option<u8>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,

    /// Driver name followed by the driver's own flags
    #[arg(value_name = "DRIVER", trailing_var_arg = true)]
    pub args: Vec<String>,
}

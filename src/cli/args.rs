//! Command-line argument parsing and validation

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release tooling for an OpenTTD AI script package
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "aipack")]
pub struct Args {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "work-dir", global = true)]
    pub work_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Swap the AI names in info.nut between release and development form
    Names {
        /// File holding the returned names
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
    },

    /// Package the current version into a tar and advance the version counter
    Package {
        /// File holding the version declaration
        #[arg(long = "counter-file")]
        counter_file: Option<PathBuf>,

        /// Show the packaging commands without running them
        #[arg(long)]
        dry_run: bool,

        /// Keep going and bump the version even if a packaging command fails
        #[arg(long)]
        keep_going: bool,
    },

    /// Regenerate libversions.nut from the downloaded library folder
    Libs {
        /// Root of the downloaded library tree
        #[arg(short = 'l', long = "library-dir")]
        library_dir: Option<PathBuf>,

        /// Declarations file to generate
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

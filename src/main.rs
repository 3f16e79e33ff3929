#![allow(clippy::cargo_common_metadata)]
use aipack::{cli, config::Config, setup_logging, utils::FileSystemUtils};
use anyhow::Result;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = cli::parse_args();

    // Setup logging based on debug flag
    setup_logging(args.debug)?;

    // Initialize configuration
    let config = Config::from_args(&args)?;

    // All configured paths are relative to the working directory
    FileSystemUtils::new().set_current_dir(&config.work_dir)?;

    // Execute the appropriate command
    cli::execute_command(&config, &args.command)
}

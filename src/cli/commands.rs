//! Command implementations for the CLI

use crate::{
    cli::Command,
    config::Config,
    core::{LibraryScanner, NameSwapper, Packager},
    utils::ProcessRunner,
};
use anyhow::Context;
use tracing::{info, instrument, warn};

/// Execute the appropriate command based on CLI arguments
#[instrument(skip(config))]
pub fn execute_command(config: &Config, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Names { .. } => execute_names_command(config),
        Command::Package { .. } => execute_package_command(config),
        Command::Libs { .. } => execute_libs_command(config),
    }
}

/// Execute the name swap command
#[instrument(skip(config))]
fn execute_names_command(config: &Config) -> anyhow::Result<()> {
    let target = &config.names.target_path;
    info!("Swapping AI names in {}", target.display());

    let swapper = NameSwapper::new(&config.names)?;
    let report = swapper
        .swap_file(target)
        .with_context(|| format!("Failed to swap AI names in {}", target.display()))?;

    for line in &report.frozen {
        warn!("Left long name on line {} unchanged", line);
    }

    info!("{} name(s) replaced", report.replacements.len());
    Ok(())
}

/// Execute the package command
#[instrument(skip(config))]
fn execute_package_command(config: &Config) -> anyhow::Result<()> {
    let runner = ProcessRunner::new(config.debug);
    let report = Packager::new(&config.package, &runner)
        .package()
        .context("Failed to package release")?;

    if report.failures() > 0 {
        warn!(
            "{} packaging command(s) failed; check {} before publishing",
            report.failures(),
            report.archive
        );
    }

    info!(
        "Packaging completed: {} (next version {})",
        report.archive, report.next_version
    );
    Ok(())
}

/// Execute the library version command
#[instrument(skip(config))]
fn execute_libs_command(config: &Config) -> anyhow::Result<()> {
    info!(
        "Scanning {} for library versions",
        config.libraries.library_dir.display()
    );

    LibraryScanner::new(&config.libraries)
        .update()
        .context("Failed to update library versions")?;

    info!("Library versions updated successfully");
    Ok(())
}

//! Configuration management for the release tooling
//!
//! Centralizes the compiled-in defaults and applies command line overrides.

use crate::{cli::Args, error::ReleaseError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Working directory for operations
    pub work_dir: PathBuf,
    /// Name swapping configuration
    pub names: NameConfig,
    /// Packaging configuration
    pub package: PackageConfig,
    /// Library scan configuration
    pub libraries: LibraryConfig,
}

/// Release and development identifiers returned from `info.nut`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameConfig {
    /// Short name of the released AI
    pub short_release: String,
    /// Long name of the released AI
    pub long_release: String,
    /// Short name of the development AI
    pub short_dev: String,
    /// Long name of the development AI
    pub long_dev: String,
    /// File holding the returned names
    pub target_path: PathBuf,
}

/// Packaging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name; spaces become `-` in archive names
    pub package_name: String,
    /// File holding the version declaration
    pub counter_file: PathBuf,
    /// Declared name of the version constant
    pub declared_name: String,
    /// Scratch directory the staging copy and archive are built in
    pub temp_dir: PathBuf,
    /// Exclusion list handed to the copy command
    pub exclude_file: PathBuf,
    /// Directory the finished archive is copied to
    pub releases_dir: PathBuf,
    /// Command templates run in order
    pub commands: Vec<CommandTemplate>,
    /// Abort before bumping the counter when a command fails
    pub strict: bool,
    /// Render commands without running them or touching the counter
    pub dry_run: bool,
}

/// A program and its argument templates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

/// Library scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root of the downloaded library tree
    pub library_dir: PathBuf,
    /// Generated declarations file
    pub output_file: PathBuf,
    /// Tracked libraries, in output order
    pub tracked: Vec<TrackedLibrary>,
}

/// A library file name prefix and the constant its version is written to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackedLibrary {
    pub prefix: String,
    pub declared_name: String,
}

impl CommandTemplate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl TrackedLibrary {
    pub fn new(prefix: &str, declared_name: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            declared_name: declared_name.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            work_dir: PathBuf::from("."),
            names: NameConfig::default(),
            package: PackageConfig::default(),
            libraries: LibraryConfig::default(),
        }
    }
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            short_release: "WORM".to_string(),
            long_release: "WormAI".to_string(),
            short_dev: "WOR0".to_string(),
            long_dev: "WormAIDev".to_string(),
            target_path: PathBuf::from("info.nut"),
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            package_name: "WormAI".to_string(),
            counter_file: PathBuf::from("version.nut"),
            declared_name: "SELF_VERSION".to_string(),
            temp_dir: PathBuf::from("../temp"),
            exclude_file: PathBuf::from("exclude.exc"),
            releases_dir: PathBuf::from("releases"),
            commands: vec![
                CommandTemplate::new("mkdir", &["-p", "{{staging_dir}}"]),
                CommandTemplate::new(
                    "rsync",
                    &["-a", "--exclude-from={{exclude_file}}", "./", "{{staging_dir}}/"],
                ),
                CommandTemplate::new(
                    "tar",
                    &["-cf", "{{temp_dir}}/{{archive}}", "-C", "{{temp_dir}}", "{{base}}"],
                ),
                CommandTemplate::new("mkdir", &["-p", "{{releases_dir}}"]),
                CommandTemplate::new("cp", &["{{temp_dir}}/{{archive}}", "{{releases_dir}}/"]),
                CommandTemplate::new(
                    "rm",
                    &["-rf", "{{temp_dir}}/{{archive}}", "{{staging_dir}}"],
                ),
            ],
            strict: true,
            dry_run: false,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_dir: PathBuf::from("../../content_download/ai/library"),
            output_file: PathBuf::from("libversions.nut"),
            tracked: vec![
                TrackedLibrary::new("SuperLib-", "SUPERLIB_VERSION"),
                TrackedLibrary::new("AILibList-", "AILIBLIST_VERSION"),
            ],
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, ReleaseError> {
        let mut config = Self {
            debug: args.debug,
            ..Self::default()
        };

        if let Some(work_dir) = &args.work_dir {
            config.work_dir = work_dir.clone();
        }

        // Override with command-specific options
        match &args.command {
            crate::cli::Command::Names { file } => {
                if let Some(file) = file {
                    config.names.target_path = file.clone();
                }
            }
            crate::cli::Command::Package {
                counter_file,
                dry_run,
                keep_going,
            } => {
                if let Some(counter_file) = counter_file {
                    config.package.counter_file = counter_file.clone();
                }
                config.package.dry_run = *dry_run;
                config.package.strict = !*keep_going;
            }
            crate::cli::Command::Libs {
                library_dir,
                output,
            } => {
                if let Some(library_dir) = library_dir {
                    config.libraries.library_dir = library_dir.clone();
                }
                if let Some(output) = output {
                    config.libraries.output_file = output.clone();
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ReleaseError> {
        if !self.work_dir.is_dir() {
            return Err(ReleaseError::config(format!(
                "Working directory not found: {}",
                self.work_dir.display()
            )));
        }

        self.names.validate()?;

        if self.package.declared_name.trim().is_empty() {
            return Err(ReleaseError::config("Version declaration name is empty"));
        }

        if self.libraries.tracked.is_empty() {
            return Err(ReleaseError::config("No libraries are tracked"));
        }
        if let Some(lib) = self.libraries.tracked.iter().find(|l| l.prefix.is_empty()) {
            return Err(ReleaseError::config(format!(
                "Library '{}' has an empty file name prefix",
                lib.declared_name
            )));
        }

        Ok(())
    }
}

impl NameConfig {
    /// All four names must be distinct and non-empty for swapping to be reversible
    pub fn validate(&self) -> Result<(), ReleaseError> {
        let names = [
            &self.short_release,
            &self.long_release,
            &self.short_dev,
            &self.long_dev,
        ];

        if names.iter().any(|n| n.is_empty()) {
            return Err(ReleaseError::config("AI names must not be empty"));
        }

        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(ReleaseError::config(format!(
                    "AI name '{a}' is configured more than once"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let names = NameConfig {
            short_dev: "WORM".to_string(),
            ..NameConfig::default()
        };
        assert!(matches!(
            names.validate(),
            Err(ReleaseError::Config { .. })
        ));
    }

    #[test]
    fn test_package_overrides() {
        let args = Args::try_parse_from([
            "aipack",
            "package",
            "--counter-file",
            "other.nut",
            "--dry-run",
            "--keep-going",
        ])
        .unwrap();
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.package.counter_file, PathBuf::from("other.nut"));
        assert!(config.package.dry_run);
        assert!(!config.package.strict);
    }

    #[test]
    fn test_no_flags_uses_defaults() {
        let args = Args::try_parse_from(["aipack", "libs"]).unwrap();
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.libraries.output_file, PathBuf::from("libversions.nut"));
        assert_eq!(config.libraries.tracked.len(), 2);
        assert!(config.package.strict);
    }
}

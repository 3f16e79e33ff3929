//! Versioned packaging
//!
//! Packages the version currently declared in the counter file, then advances
//! the counter. The archive is always named after the version in effect when
//! packaging started.

use crate::{
    config::PackageConfig,
    core::counter::VersionCounter,
    error::{ReleaseError, Result},
    utils::{
        process::{display_command, CommandRunner},
        template::{self, TemplateVars},
    },
};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Names derived from the package name and version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNames {
    /// `<pack name>-v<version>`
    pub base: String,
    /// `<base>.tar`
    pub archive: String,
}

impl PackageNames {
    pub fn new(package_name: &str, version: u64) -> Self {
        let pack_name = package_name.replace(' ', "-");
        let base = format!("{pack_name}-v{version}");
        let archive = format!("{base}.tar");
        Self { base, archive }
    }
}

/// A packaging command after placeholder substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&display_command(&self.program, &self.args))
    }
}

/// What happened to one packaging command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Succeeded,
    Failed,
    Skipped,
}

/// Result of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Version the archive was built for
    pub version: u64,
    /// Counter value after the run; equal to `version` on a dry run
    pub next_version: u64,
    pub archive: String,
    pub commands: Vec<(RenderedCommand, CommandOutcome)>,
}

impl PackageReport {
    pub fn failures(&self) -> usize {
        self.commands
            .iter()
            .filter(|(_, outcome)| *outcome == CommandOutcome::Failed)
            .count()
    }
}

/// Runs the packaging commands and bumps the version counter
pub struct Packager<'a, R: CommandRunner> {
    config: &'a PackageConfig,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Packager<'a, R> {
    /// Create a new packager
    pub fn new(config: &'a PackageConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Substitute names and paths into every configured command
    pub fn render_commands(
        &self,
        names: &PackageNames,
        version: u64,
    ) -> Result<Vec<RenderedCommand>> {
        let version = version.to_string();
        let temp_dir = path_str(&self.config.temp_dir);
        let staging_dir = path_str(&self.config.temp_dir.join(&names.base));
        let exclude_file = path_str(&self.config.exclude_file);
        let releases_dir = path_str(&self.config.releases_dir);

        let vars = [
            (TemplateVars::VERSION, version.as_str()),
            (TemplateVars::BASE, names.base.as_str()),
            (TemplateVars::ARCHIVE, names.archive.as_str()),
            (TemplateVars::TEMP_DIR, temp_dir.as_str()),
            (TemplateVars::STAGING_DIR, staging_dir.as_str()),
            (TemplateVars::EXCLUDE_FILE, exclude_file.as_str()),
            (TemplateVars::RELEASES_DIR, releases_dir.as_str()),
        ];

        self.config
            .commands
            .iter()
            .map(|cmd| {
                let rendered = RenderedCommand {
                    program: template::render(&cmd.program, &vars),
                    args: cmd.args.iter().map(|a| template::render(a, &vars)).collect(),
                };

                let unknown: Vec<String> = std::iter::once(&rendered.program)
                    .chain(&rendered.args)
                    .flat_map(|s| template::unresolved(s))
                    .collect();
                if !unknown.is_empty() {
                    return Err(ReleaseError::config(format!(
                        "Unknown placeholder(s) {} in packaging command '{}'",
                        unknown.join(", "),
                        cmd.program
                    )));
                }

                Ok(rendered)
            })
            .collect()
    }

    /// Package the current version, then advance the counter
    #[instrument(skip(self))]
    pub fn package(&self) -> Result<PackageReport> {
        let counter_file = &self.config.counter_file;
        let counter = VersionCounter::read(counter_file, &self.config.declared_name)?;
        let version = counter.version;
        let next = counter.next_version()?;

        let names = PackageNames::new(&self.config.package_name, version);
        let commands = self.render_commands(&names, version)?;

        info!(
            "Packaging {} version {} as {}",
            self.config.package_name, version, names.archive
        );

        if self.config.dry_run {
            for cmd in &commands {
                info!("[dry-run] {}", cmd);
            }
            info!("[dry-run] would advance {} to {}", self.config.declared_name, next);
            return Ok(PackageReport {
                version,
                next_version: version,
                archive: names.archive,
                commands: commands
                    .into_iter()
                    .map(|cmd| (cmd, CommandOutcome::Skipped))
                    .collect(),
            });
        }

        let mut outcomes = Vec::with_capacity(commands.len());
        for cmd in commands {
            let failure = match self.runner.run(&cmd.program, &cmd.args) {
                Ok(result) if result.success => None,
                Ok(result) => Some(result.into_error(cmd.to_string())),
                Err(e) => Some(e),
            };

            match failure {
                None => outcomes.push((cmd, CommandOutcome::Succeeded)),
                Some(e) if self.config.strict => {
                    warn!("Packaging aborted, {} stays at {}", self.config.declared_name, version);
                    return Err(e);
                }
                Some(e) => {
                    warn!("Ignoring failed packaging command: {}", e);
                    outcomes.push((cmd, CommandOutcome::Failed));
                }
            }
        }

        let next_version = counter.persist_next(counter_file)?;
        info!(
            "Packaged {}; {} advanced to {}",
            names.archive, self.config.declared_name, next_version
        );

        Ok(PackageReport {
            version,
            next_version,
            archive: names.archive,
            commands: outcomes,
        })
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::CommandTemplate, utils::process::ProcessResult};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Records every command and fails the ones whose program is listed
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<String>>,
        failing: Vec<&'static str>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<ProcessResult> {
            self.calls.borrow_mut().push(display_command(program, args));
            if self.failing.contains(&program) {
                Ok(ProcessResult {
                    exit_code: Some(1),
                    stderr: "failed".to_string(),
                    success: false,
                })
            } else {
                Ok(ProcessResult::ok())
            }
        }
    }

    fn create_test_config(temp_dir: &TempDir, counter: &str) -> PackageConfig {
        let counter_file = temp_dir.path().join("version.nut");
        fs::write(&counter_file, counter).unwrap();
        PackageConfig {
            package_name: "Worm AI".to_string(),
            counter_file,
            declared_name: "MY_VERSION".to_string(),
            temp_dir: "tmp".into(),
            exclude_file: "exclude.exc".into(),
            releases_dir: "releases".into(),
            commands: vec![
                CommandTemplate::new(
                    "tar",
                    &["-cf", "{{temp_dir}}/{{archive}}", "-C", "{{temp_dir}}", "{{base}}"],
                ),
                CommandTemplate::new("cp", &["{{temp_dir}}/{{archive}}", "{{releases_dir}}/"]),
            ],
            strict: true,
            dry_run: false,
        }
    }

    const COUNTER: &str = "// header\nMY_VERSION <- 41;\nOTHER <- 7;\n";

    #[test]
    fn test_package_names() {
        let names = PackageNames::new("Worm AI", 12);
        assert_eq!(names.base, "Worm-AI-v12");
        assert_eq!(names.archive, "Worm-AI-v12.tar");
    }

    #[test]
    fn test_package_uses_version_read_at_start() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir, COUNTER);
        let runner = RecordingRunner::default();

        let report = Packager::new(&config, &runner).package().unwrap();

        assert_eq!(report.version, 41);
        assert_eq!(report.next_version, 42);
        assert_eq!(report.archive, "Worm-AI-v41.tar");
        assert_eq!(
            *runner.calls.borrow(),
            vec![
                "tar -cf tmp/Worm-AI-v41.tar -C tmp Worm-AI-v41".to_string(),
                "cp tmp/Worm-AI-v41.tar releases/".to_string(),
            ]
        );
        assert_eq!(
            fs::read_to_string(&config.counter_file).unwrap(),
            "// header\nMY_VERSION <- 42;\nOTHER <- 7;\n"
        );
    }

    #[test]
    fn test_missing_declaration_runs_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let content = "// header\nOTHER <- 7;\n";
        let config = create_test_config(&temp_dir, content);
        let runner = RecordingRunner::default();

        let result = Packager::new(&config, &runner).package();

        assert!(matches!(result, Err(ReleaseError::PatternNotFound { .. })));
        assert!(runner.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&config.counter_file).unwrap(), content);
    }

    #[test]
    fn test_strict_failure_keeps_counter() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir, COUNTER);
        let runner = RecordingRunner {
            failing: vec!["tar"],
            ..Default::default()
        };

        let result = Packager::new(&config, &runner).package();

        assert!(matches!(result, Err(ReleaseError::Process { exit_code: Some(1), .. })));
        assert_eq!(runner.calls.borrow().len(), 1);
        assert_eq!(fs::read_to_string(&config.counter_file).unwrap(), COUNTER);
    }

    #[test]
    fn test_keep_going_bumps_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir, COUNTER);
        config.strict = false;
        let runner = RecordingRunner {
            failing: vec!["tar"],
            ..Default::default()
        };

        let report = Packager::new(&config, &runner).package().unwrap();

        assert_eq!(report.failures(), 1);
        assert_eq!(runner.calls.borrow().len(), 2);
        assert_eq!(report.next_version, 42);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir, COUNTER);
        config.dry_run = true;
        let runner = RecordingRunner::default();

        let report = Packager::new(&config, &runner).package().unwrap();

        assert!(runner.calls.borrow().is_empty());
        assert!(report
            .commands
            .iter()
            .all(|(_, outcome)| *outcome == CommandOutcome::Skipped));
        assert_eq!(report.next_version, 41);
        assert_eq!(fs::read_to_string(&config.counter_file).unwrap(), COUNTER);
    }

    #[test]
    fn test_unknown_placeholder_is_rejected_before_running() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir, COUNTER);
        config.commands.push(CommandTemplate::new("echo", &["{{missing}}"]));
        let runner = RecordingRunner::default();

        let result = Packager::new(&config, &runner).package();

        assert!(matches!(result, Err(ReleaseError::Config { .. })));
        assert!(runner.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&config.counter_file).unwrap(), COUNTER);
    }
}

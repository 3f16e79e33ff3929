//! Process execution utilities
//!
//! Provides process execution with proper error handling and logging.
//! Callers go through [`CommandRunner`] so packaging can be exercised
//! without spawning real programs.

use crate::error::{ReleaseError, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info, instrument};

/// Something that can run an external program to completion
pub trait CommandRunner {
    /// Run `program` with `args`, returning its outcome.
    ///
    /// A program that ran and exited non-zero is an `Ok` with `success == false`;
    /// `Err` is reserved for programs that could not be started.
    fn run(&self, program: &str, args: &[String]) -> Result<ProcessResult>;
}

/// Utility for running external processes
#[derive(Debug)]
pub struct ProcessRunner {
    debug: bool,
}

/// Result of a process execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit status code
    pub exit_code: Option<i32>,
    /// Standard error
    pub stderr: String,
    /// Whether the process was successful
    pub success: bool,
}

impl ProcessResult {
    /// Successful outcome with exit code 0
    pub fn ok() -> Self {
        Self {
            exit_code: Some(0),
            stderr: String::new(),
            success: true,
        }
    }

    /// Turn a failed outcome into a [`ReleaseError::Process`]
    pub fn into_error(self, command: impl Into<String>) -> ReleaseError {
        ReleaseError::process(command, self.exit_code, self.stderr)
    }
}

/// Render a program line for logging
pub fn display_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

impl ProcessRunner {
    /// Create a new process runner
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl CommandRunner for ProcessRunner {
    /// Run a command with arguments, inheriting stdout and capturing stderr
    #[instrument(skip(self))]
    fn run(&self, program: &str, args: &[String]) -> Result<ProcessResult> {
        let cmd_str = display_command(program, args);

        if self.debug {
            debug!("Running command: {}", cmd_str);
        } else {
            info!("+ {}", cmd_str);
        }

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ReleaseError::process(
                    cmd_str.clone(),
                    None,
                    format!("Failed to execute command: {e}"),
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let success = output.status.success();
        let exit_code = output.status.code();

        debug!(
            "Command finished: success={}, exit_code={:?}, stderr_len={}",
            success,
            exit_code,
            stderr.len()
        );

        if !success && !stderr.is_empty() {
            debug!("Command stderr: {}", stderr);
        }

        Ok(ProcessResult {
            exit_code,
            stderr,
            success,
        })
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(false)
    }
}

//! Utility modules for common functionality
//!
//! Provides reusable utilities for file operations, process execution,
//! and command templating.

pub mod fs;
pub mod process;
pub mod template;

pub use fs::FileSystemUtils;
pub use process::{CommandRunner, ProcessResult, ProcessRunner};

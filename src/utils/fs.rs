//! File system utility functions
//!
//! Provides safe file operations with proper error handling.

use crate::error::{ReleaseError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Read a whole text file, reporting a missing file as [`ReleaseError::FileNotFound`]
    #[instrument(skip(self))]
    pub fn read_file_to_string<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> Result<String> {
        let path = path.as_ref();
        debug!("Reading file: {}", path.display());

        fs::read_to_string(path).map_err(|e| read_error(path, e))
    }

    /// Read a whole file as raw bytes
    #[instrument(skip(self))]
    pub fn read_file<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        debug!("Reading file: {}", path.display());

        fs::read(path).map_err(|e| read_error(path, e))
    }

    /// Replace a file's content atomically.
    ///
    /// The content goes to a temporary file next to `path` which is then renamed
    /// over it, so a failed write leaves the original untouched. Permissions of
    /// an existing file are carried over.
    #[instrument(skip(self, contents))]
    pub fn write_file_atomic<P: AsRef<Path> + std::fmt::Debug, C: AsRef<[u8]>>(
        &self,
        path: P,
        contents: C,
    ) -> Result<()> {
        let path = path.as_ref();
        let parent = parent_dir(path);

        debug!("Writing file atomically: {}", path.display());

        let mut tmp = NamedTempFile::new_in(&parent)
            .map_err(|e| ReleaseError::file_system("create temporary file", &parent, e))?;
        tmp.write_all(contents.as_ref())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| ReleaseError::file_system("write", tmp.path().to_path_buf(), e))?;

        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(tmp.path(), metadata.permissions())
                .map_err(|e| {
                    ReleaseError::file_system("set permissions", tmp.path().to_path_buf(), e)
                })?;
        }

        tmp.persist(path)
            .map_err(|e| ReleaseError::file_system("rename", path, e.error))?;

        debug!("File written successfully");
        Ok(())
    }

    /// Fail with [`ReleaseError::DirectoryNotFound`] unless `path` is a directory
    pub fn require_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(())
        } else {
            Err(ReleaseError::directory_not_found(path))
        }
    }

    /// Change the current working directory
    #[instrument(skip(self))]
    pub fn set_current_dir<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Changing directory to: {}", path.display());
        std::env::set_current_dir(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReleaseError::directory_not_found(path),
            _ => ReleaseError::file_system("change directory", path, e),
        })
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}

fn read_error(path: &Path, e: io::Error) -> ReleaseError {
    match e.kind() {
        io::ErrorKind::NotFound => ReleaseError::file_not_found(path),
        _ => ReleaseError::file_system("read", path, e),
    }
}

/// Directory a file lives in; a bare file name lives in `.`
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

//! Latest library version detection
//!
//! Library downloads are named `<Library>-<version>.tar`. The highest version of
//! each tracked library found below the library folder is written to a generated
//! declarations file.

use crate::{
    config::{LibraryConfig, TrackedLibrary},
    error::Result,
    utils::fs::FileSystemUtils,
};
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

const HEADER: [&str; 4] = [
    "/*",
    " * Warning: this is an automatically generated file. Do not change by hand.",
    " * Any changes you make will be lost the next time it's regenerated!",
    "*/",
];

/// Highest version seen for one tracked library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryVersion {
    pub library: TrackedLibrary,
    pub version: u64,
}

impl LibraryVersion {
    /// Prefix without its trailing separator, for log output
    pub fn display_name(&self) -> &str {
        self.library.prefix.trim_end_matches('-')
    }
}

/// Latest versions of all tracked libraries, in configuration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryVersionRecord {
    pub entries: Vec<LibraryVersion>,
}

impl LibraryVersionRecord {
    /// Version found for `declared_name`
    pub fn get(&self, declared_name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.library.declared_name == declared_name)
            .map(|e| e.version)
    }

    /// Render the declarations file
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in HEADER {
            out.push_str(line);
            out.push_str(LINE_ENDING);
        }
        out.push_str(LINE_ENDING);
        for entry in &self.entries {
            out.push_str(&format!(
                "{} <- {};{}",
                entry.library.declared_name, entry.version, LINE_ENDING
            ));
        }
        out
    }
}

/// Version number of a library file name.
///
/// The number sits between the first `-` and the next `.`; anything that is
/// not a plain unsigned integer counts as 0.
pub fn version_from_file_name(name: &str) -> u64 {
    let Some((_, rest)) = name.split_once('-') else {
        return 0;
    };
    let number = rest.split('.').next().unwrap_or_default();

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    number.parse().unwrap_or(0)
}

/// Scans a library folder for the latest tracked library versions
pub struct LibraryScanner<'a> {
    config: &'a LibraryConfig,
    fs_utils: FileSystemUtils,
}

impl<'a> LibraryScanner<'a> {
    /// Create a new scanner
    pub fn new(config: &'a LibraryConfig) -> Self {
        Self {
            config,
            fs_utils: FileSystemUtils::new(),
        }
    }

    /// Walk `root` and keep the highest version per tracked prefix
    #[instrument(skip(self))]
    pub fn scan(&self, root: &Path) -> Result<LibraryVersionRecord> {
        self.fs_utils.require_dir(root)?;

        let mut entries: Vec<LibraryVersion> = self
            .config
            .tracked
            .iter()
            .map(|library| LibraryVersion {
                library: library.clone(),
                version: 0,
            })
            .collect();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry below {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };

            if let Some(slot) = entries
                .iter_mut()
                .find(|e| file_name.starts_with(&e.library.prefix))
            {
                let version = version_from_file_name(file_name);
                debug!("{} -> {} version {}", file_name, slot.display_name(), version);
                slot.version = slot.version.max(version);
            }
        }

        for entry in &entries {
            info!("Current {} version is {}", entry.display_name(), entry.version);
        }

        Ok(LibraryVersionRecord { entries })
    }

    /// Scan the configured folder and overwrite the declarations file
    #[instrument(skip(self))]
    pub fn update(&self) -> Result<LibraryVersionRecord> {
        let record = self.scan(&self.config.library_dir)?;

        self.fs_utils
            .write_file_atomic(&self.config.output_file, record.render().as_bytes())?;
        info!("Wrote {}", self.config.output_file.display());

        Ok(record)
    }
}

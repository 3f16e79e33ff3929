//! Version counter stored in `version.nut`
//!
//! The counter is the integer assigned on a line like `SELF_VERSION <- 12;`.
//! If the name is declared more than once the last declaration counts.
//! Bumping rewrites only the digits of that line.

use crate::{
    error::{ReleaseError, Result},
    utils::fs::FileSystemUtils,
};
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// A version counter located inside its file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCounter {
    /// Current value
    pub version: u64,
    /// 0-based index of the declaration line
    pub line_index: usize,
    content: String,
    digits: Range<usize>,
}

impl VersionCounter {
    /// Read the counter declared as `name` from `path`
    #[instrument]
    pub fn read(path: &Path, name: &str) -> Result<Self> {
        let content = FileSystemUtils::new().read_file_to_string(path)?;
        Self::parse(content, name, path)
    }

    /// Locate the declaration of `name` in `content`; `path` is used for diagnostics
    pub fn parse(content: String, name: &str, path: &Path) -> Result<Self> {
        let re = declaration_regex(name)?;

        let mut found: Option<(usize, Range<usize>)> = None;
        let mut offset = 0;

        for (index, line) in content.split_inclusive('\n').enumerate() {
            if let Some(m) = re.captures(line).and_then(|cap| cap.get(1)) {
                if let Some((earlier, _)) = &found {
                    warn!(
                        "{} is declared again on line {} of {}; ignoring line {}",
                        name,
                        index + 1,
                        path.display(),
                        earlier + 1
                    );
                }
                found = Some((index, offset + m.start()..offset + m.end()));
            }
            offset += line.len();
        }

        let Some((line_index, digits)) = found else {
            return Err(ReleaseError::pattern_not_found(
                format!("{name} <- <integer>"),
                path,
            ));
        };

        let version = content[digits.clone()].parse::<u64>().map_err(|e| {
            ReleaseError::validation(format!(
                "{} in {} is not a valid version: {}",
                name,
                path.display(),
                e
            ))
        })?;

        debug!("Found {} = {} on line {}", name, version, line_index + 1);

        Ok(Self {
            version,
            line_index,
            content,
            digits,
        })
    }

    /// The counter value after one bump
    pub fn next_version(&self) -> Result<u64> {
        self.version
            .checked_add(1)
            .ok_or_else(|| ReleaseError::validation("Version counter overflow"))
    }

    /// File content with the declaration advanced by one and nothing else changed
    pub fn bumped_content(&self) -> Result<String> {
        let next = self.next_version()?.to_string();

        let mut out = String::with_capacity(self.content.len() + 1);
        out.push_str(&self.content[..self.digits.start]);
        out.push_str(&next);
        out.push_str(&self.content[self.digits.end..]);
        Ok(out)
    }

    /// Write the bumped content back over `path`, returning the new version
    #[instrument(skip(self))]
    pub fn persist_next(&self, path: &Path) -> Result<u64> {
        let next = self.next_version()?;
        FileSystemUtils::new().write_file_atomic(path, self.bumped_content()?.as_bytes())?;
        Ok(next)
    }
}

fn declaration_regex(name: &str) -> Result<Regex> {
    Regex::new(&format!(r"\b{}\s+<-\s+([0-9]+)", regex::escape(name)))
        .map_err(|e| ReleaseError::config(format!("Failed to compile regex: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VERSION_NUT: &str = "// Version of our AI\r\n\
        \r\n\
        SELF_VERSION <- 41;\r\n\
        SELF_DATE <- \"2013-06-01\";\r\n";

    fn parse(content: &str, name: &str) -> Result<VersionCounter> {
        VersionCounter::parse(content.to_string(), name, Path::new("version.nut"))
    }

    #[test]
    fn test_parse_finds_declaration() {
        let counter = parse(VERSION_NUT, "SELF_VERSION").unwrap();
        assert_eq!(counter.version, 41);
        assert_eq!(counter.line_index, 2);
    }

    #[test]
    fn test_bump_changes_only_the_declaration() {
        let counter = parse(VERSION_NUT, "SELF_VERSION").unwrap();
        let bumped = counter.bumped_content().unwrap();

        let before: Vec<&str> = VERSION_NUT.split_inclusive('\n').collect();
        let after: Vec<&str> = bumped.split_inclusive('\n').collect();
        assert_eq!(before.len(), after.len());
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            if i == 2 {
                assert_eq!(*a, "SELF_VERSION <- 42;\r\n");
            } else {
                assert_eq!(b, a);
            }
        }
    }

    #[test]
    fn test_bump_across_digit_boundary() {
        let counter = parse("MY_VERSION <- 99;", "MY_VERSION").unwrap();
        assert_eq!(counter.bumped_content().unwrap(), "MY_VERSION <- 100;");
    }

    #[test]
    fn test_missing_declaration() {
        let result = parse("SELF_DATE <- 1;\n", "SELF_VERSION");
        assert!(matches!(result, Err(ReleaseError::PatternNotFound { .. })));
    }

    #[test]
    fn test_name_must_match_whole_word() {
        let result = parse("MY_SELF_VERSION <- 3;\n", "SELF_VERSION");
        assert!(matches!(result, Err(ReleaseError::PatternNotFound { .. })));
    }

    #[test]
    fn test_last_declaration_wins() {
        let counter = parse("SELF_VERSION <- 1;\nSELF_VERSION <- 7;\n", "SELF_VERSION").unwrap();
        assert_eq!(counter.version, 7);
        assert_eq!(counter.line_index, 1);
        assert_eq!(
            counter.bumped_content().unwrap(),
            "SELF_VERSION <- 1;\nSELF_VERSION <- 8;\n"
        );
    }

    #[test]
    fn test_overflow_is_rejected() {
        let content = format!("V <- {};", u64::MAX);
        let counter = parse(&content, "V").unwrap();
        assert!(matches!(
            counter.bumped_content(),
            Err(ReleaseError::Validation { .. })
        ));
    }

    #[test]
    fn test_read_and_persist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("version.nut");
        fs::write(&path, VERSION_NUT).unwrap();

        let counter = VersionCounter::read(&path, "SELF_VERSION").unwrap();
        assert_eq!(counter.persist_next(&path).unwrap(), 42);

        let reread = VersionCounter::read(&path, "SELF_VERSION").unwrap();
        assert_eq!(reread.version, 42);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = VersionCounter::read(&temp_dir.path().join("version.nut"), "SELF_VERSION");
        assert!(matches!(result, Err(ReleaseError::FileNotFound { .. })));
    }
}

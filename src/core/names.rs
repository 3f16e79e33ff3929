//! Release/development name swapping for `info.nut`
//!
//! Every `return "<token>"` whose token is one of the configured AI names is
//! switched to its counterpart. Only the first long name in a file is swapped;
//! `CreateInstance()` is expected to come after `GetName()` and return the same
//! long name, and must keep naming the class the script actually declares.
//!
//! The file is handled as raw bytes so comments in any encoding and every line
//! terminator (`\n`, `\r\n`, lone `\r`) survive untouched.

use crate::{
    config::NameConfig,
    error::{ReleaseError, Result},
    utils::fs::FileSystemUtils,
};
use regex::bytes::Regex;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Whether a name pair is the short or the long identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Short,
    Long,
}

/// A release identifier and the development identifier it swaps with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePair {
    pub release: String,
    pub dev: String,
    pub kind: NameKind,
}

impl NamePair {
    /// The counterpart of `token`, if it belongs to this pair
    fn counterpart(&self, token: &[u8]) -> Option<&str> {
        if token == self.release.as_bytes() {
            Some(&self.dev)
        } else if token == self.dev.as_bytes() {
            Some(&self.release)
        } else {
            None
        }
    }
}

/// A line of the target file with its terminator kept intact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Raw bytes including `\n`, `\r\n` or `\r`
    pub raw: &'a [u8],
    /// Byte span of the quoted token, if the line returns a string
    pub token: Option<Range<usize>>,
}

impl SourceLine<'_> {
    pub fn token_bytes(&self) -> Option<&[u8]> {
        self.token.clone().map(|span| &self.raw[span])
    }
}

/// A single token substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// 1-based line number
    pub line: usize,
    pub from: String,
    pub to: String,
}

/// Outcome of one swap pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapReport {
    pub replacements: Vec<Replacement>,
    /// 1-based line numbers of long names left alone
    pub frozen: Vec<usize>,
}

impl SwapReport {
    pub fn changed(&self) -> bool {
        !self.replacements.is_empty()
    }
}

/// Split `content` after every `\n`, `\r\n` or lone `\r`, keeping the terminators
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < content.len() {
        let end = match content[i] {
            b'\r' if content.get(i + 1) == Some(&b'\n') => Some(i + 2),
            b'\r' | b'\n' => Some(i + 1),
            _ => None,
        };
        match end {
            Some(end) => {
                lines.push(&content[start..end]);
                start = end;
                i = end;
            }
            None => i += 1,
        }
    }

    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Swaps AI names between their release and development form
pub struct NameSwapper {
    pairs: [NamePair; 2],
    fs_utils: FileSystemUtils,
    re_return: Regex,
}

impl NameSwapper {
    /// Create a new swapper for the configured names
    pub fn new(config: &NameConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pairs: [
                NamePair {
                    release: config.short_release.clone(),
                    dev: config.short_dev.clone(),
                    kind: NameKind::Short,
                },
                NamePair {
                    release: config.long_release.clone(),
                    dev: config.long_dev.clone(),
                    kind: NameKind::Long,
                },
            ],
            fs_utils: FileSystemUtils::new(),
            re_return: Regex::new(r#"return\s+"([a-zA-Z0-9]+)""#)
                .map_err(|e| ReleaseError::config(format!("Failed to compile regex: {}", e)))?,
        })
    }

    /// Split `content` into lines and locate the returned token in each
    pub fn scan_lines<'a>(&self, content: &'a [u8]) -> Vec<SourceLine<'a>> {
        split_lines(content)
            .into_iter()
            .map(|raw| SourceLine {
                raw,
                token: self
                    .re_return
                    .captures(raw)
                    .and_then(|cap| cap.get(1))
                    .map(|m| m.range()),
            })
            .collect()
    }

    /// Swap names in memory, returning the new content and what changed
    pub fn swap_bytes(&self, content: &[u8]) -> (Vec<u8>, SwapReport) {
        let mut output = Vec::with_capacity(content.len());
        let mut report = SwapReport::default();
        let mut long_name_found = false;

        for (i, line) in self.scan_lines(content).into_iter().enumerate() {
            let line_no = i + 1;
            let (Some(span), Some(token)) = (line.token.clone(), line.token_bytes()) else {
                output.extend_from_slice(line.raw);
                continue;
            };
            let token_str = String::from_utf8_lossy(token);

            let matched = self
                .pairs
                .iter()
                .find_map(|pair| pair.counterpart(token).map(|to| (pair.kind, to)));

            let replacement = match matched {
                Some((NameKind::Short, to)) => Some(to),
                Some((NameKind::Long, _)) if long_name_found => {
                    debug!("Leaving second long name '{}' on line {}", token_str, line_no);
                    report.frozen.push(line_no);
                    None
                }
                Some((NameKind::Long, to)) => {
                    long_name_found = true;
                    Some(to)
                }
                None => None,
            };

            match replacement {
                Some(to) => {
                    info!("Replacing: '{}' with: '{}'", token_str, to);
                    output.extend_from_slice(&line.raw[..span.start]);
                    output.extend_from_slice(to.as_bytes());
                    output.extend_from_slice(&line.raw[span.end..]);
                    report.replacements.push(Replacement {
                        line: line_no,
                        from: token_str.into_owned(),
                        to: to.to_string(),
                    });
                }
                None => output.extend_from_slice(line.raw),
            }
        }

        (output, report)
    }

    /// Swap names in a file, replacing it atomically when anything changed
    #[instrument(skip(self))]
    pub fn swap_file<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> Result<SwapReport> {
        let path = path.as_ref();
        let content = self.fs_utils.read_file(path)?;

        let (swapped, report) = self.swap_bytes(&content);

        if report.changed() {
            self.fs_utils.write_file_atomic(path, &swapped)?;
        } else {
            info!("No AI names found in {}", path.display());
        }

        Ok(report)
    }
}

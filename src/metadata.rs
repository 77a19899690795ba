//! Lightweight reader/writer for the package's metadata source.
//!
//! The version has to be known before the package's own runtime is
//! importable, so declarations are pulled out of the file textually instead
//! of loading it.

use regex::Regex;
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, StampError};
use crate::version::BaseVersion;

/// A metadata source file holding `key = "value"` declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFile {
    path: PathBuf,
}

impl MetadataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MetadataFile { path: path.into() }
    }

    /// Reads the value declared for `key`.
    pub fn fetch(&self, key: &str) -> Result<String> {
        let source = fs::read_to_string(&self.path).map_err(|e| {
            StampError::metadata(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        extract_value(&source, key).ok_or_else(|| {
            StampError::metadata(format!(
                "no '{}' declaration in {}",
                key,
                self.path.display()
            ))
        })
    }

    /// Reads the declared base version.
    pub fn base_version(&self, key: &str) -> Result<BaseVersion> {
        BaseVersion::parse(&self.fetch(key)?)
    }

    /// Rewrites the `key` declaration in place, leaving every other byte alone.
    ///
    /// Returns `Ok(false)` if the file has no such declaration.
    pub fn rewrite(&self, key: &str, value: &str) -> Result<bool> {
        let source = fs::read_to_string(&self.path)?;
        match replace_value(&source, key, value) {
            Some(updated) => {
                fs::write(&self.path, updated)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Matches a line declaring `key`, capturing its indentation and value.
fn declaration(key: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?m)^([ \t]*){}[ \t]*=[ \t]*([^\r\n]*)",
        regex::escape(key)
    ))
    .ok()
}

/// Extracts the value of the first line declaring `key`.
///
/// Surrounding quotes and whitespace are stripped, so `__version__ = '1.0'`
/// and `__version__ = "1.0"` both give `1.0`.
pub fn extract_value(source: &str, key: &str) -> Option<String> {
    let raw = declaration(key)?.captures(source)?.get(2)?.as_str();
    let value = raw.trim().trim_matches(|c: char| c == '\'' || c == '"');
    Some(value.to_string())
}

/// Replaces the first line declaring `key` with `key = '<value>'`, keeping
/// its indentation. This is the same line [`extract_value`] reads.
///
/// Returns `None` when no line declares `key`.
pub fn replace_value(source: &str, key: &str, value: &str) -> Option<String> {
    let caps = declaration(key)?.captures(source)?;
    let found = caps.get(0)?;
    let indent = caps.get(1).map_or("", |m| m.as_str());

    let mut updated = String::with_capacity(source.len() + value.len());
    updated.push_str(&source[..found.start()]);
    updated.push_str(&format!("{}{} = '{}'", indent, key, value));
    updated.push_str(&source[found.end()..]);
    Some(updated)
}

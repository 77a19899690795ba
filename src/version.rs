use std::fmt;

use crate::error::{Result, StampError};

/// Marker that identifies a development (unreleased) base version.
pub const DEV_MARKER: &str = "dev";

/// Local suffix used for editable/developer installs.
pub const EDITABLE: &str = "editable";

/// Number of commit-id characters carried in a local suffix.
pub const SHORT_COMMIT_LEN: usize = 7;

/// The human-maintained version declared in the metadata source.
///
/// Follows `MAJOR.MINOR.PATCH[.devN]`. Only the `dev` marker matters here;
/// the rest of the string is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseVersion(String);

impl BaseVersion {
    /// Parses a declared version string.
    ///
    /// Rejects empty values and values containing whitespace, which means the
    /// declaration could not be read cleanly.
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(StampError::metadata("declared version is empty"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(StampError::metadata(format!(
                "declared version '{}' contains whitespace",
                value
            )));
        }
        Ok(BaseVersion(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the version denotes an unreleased development state.
    pub fn is_development(&self) -> bool {
        self.0.contains(DEV_MARKER)
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The local-version data appended to a development version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSuffix {
    /// Short commit id of the checkout being built.
    Commit(String),
    /// The package is installed in editable/developer mode.
    Editable,
}

impl LocalSuffix {
    /// Builds a commit suffix from a full commit id.
    ///
    /// Returns `None` unless the id starts with at least
    /// [`SHORT_COMMIT_LEN`] hex digits.
    pub fn from_commit(commit_id: &str) -> Option<Self> {
        let short = commit_id.get(..SHORT_COMMIT_LEN)?;
        if short.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(LocalSuffix::Commit(short.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LocalSuffix::Commit(short) => short,
            LocalSuffix::Editable => EDITABLE,
        }
    }
}

impl fmt::Display for LocalSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The final version string reported for this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    /// The base version, unchanged.
    pub fn unchanged(base: &BaseVersion) -> Self {
        ResolvedVersion(base.as_str().to_string())
    }

    /// The base version with a `+suffix` local segment.
    pub fn with_suffix(base: &BaseVersion, suffix: &LocalSuffix) -> Self {
        ResolvedVersion(format!("{}+{}", base, suffix))
    }

    /// Wraps an already resolved version string, e.g. one handed back by the host.
    pub fn from_resolved(value: impl Into<String>) -> Self {
        ResolvedVersion(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The data after the `+` delimiter, if any.
    pub fn local_segment(&self) -> Option<&str> {
        self.0.split_once('+').map(|(_, local)| local)
    }

    pub fn is_editable(&self) -> bool {
        self.0.ends_with(EDITABLE)
    }

    /// True when the installed metadata should be rewritten to this value.
    pub fn needs_stamp(&self) -> bool {
        self.0.contains(DEV_MARKER) && self.local_segment().is_some() && !self.is_editable()
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_version_dev_detection() {
        assert!(BaseVersion::parse("1.2.0.dev1").unwrap().is_development());
        assert!(BaseVersion::parse("0.7.0.dev0").unwrap().is_development());
        assert!(!BaseVersion::parse("1.2.0").unwrap().is_development());
    }

    #[test]
    fn test_base_version_parse_invalid() {
        assert!(BaseVersion::parse("").is_err());
        assert!(BaseVersion::parse("1.2 .0").is_err());
    }

    #[test]
    fn test_suffix_from_commit() {
        assert_eq!(
            LocalSuffix::from_commit("abcdef1234567890abcdef1234567890abcdef12"),
            Some(LocalSuffix::Commit("abcdef1".to_string()))
        );
        assert_eq!(
            LocalSuffix::from_commit("ABCDEF1234"),
            Some(LocalSuffix::Commit("abcdef1".to_string()))
        );
    }

    #[test]
    fn test_suffix_from_malformed_commit() {
        assert_eq!(LocalSuffix::from_commit("abc"), None);
        assert_eq!(LocalSuffix::from_commit("ref: refs/heads/main"), None);
        assert_eq!(LocalSuffix::from_commit(""), None);
    }

    #[test]
    fn test_resolved_local_segment() {
        let base = BaseVersion::parse("1.2.0.dev1").unwrap();
        let v = ResolvedVersion::with_suffix(&base, &LocalSuffix::Editable);
        assert_eq!(v.as_str(), "1.2.0.dev1+editable");
        assert_eq!(v.local_segment(), Some("editable"));
        assert!(v.is_editable());
        assert!(!v.needs_stamp());
    }

    #[test]
    fn test_resolved_needs_stamp() {
        let base = BaseVersion::parse("1.2.0.dev1").unwrap();
        let commit = LocalSuffix::Commit("abcdef1".to_string());
        assert!(ResolvedVersion::with_suffix(&base, &commit).needs_stamp());
        assert!(!ResolvedVersion::unchanged(&base).needs_stamp());
        assert!(!ResolvedVersion::from_resolved("1.2.0").needs_stamp());
    }
}

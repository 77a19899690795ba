use std::fmt;

use crate::stamper::SkipReason;

/// Non-fatal degradations during a build.
/// The build goes on; these are reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildWarning {
    /// Development version reported without local version data
    NoLocalVersion { base: String },
    /// Installed metadata could not be brought in line with the resolved version
    StampSkipped { reason: SkipReason },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::NoLocalVersion { base } => write!(
                f,
                "No commit id available for development version '{}', reporting it unqualified",
                base
            ),
            BuildWarning::StampSkipped { reason } => {
                write!(f, "Installed version was not stamped: {}", reason)
            }
        }
    }
}

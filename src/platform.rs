use std::fmt;
use std::str::FromStr;

use crate::error::StampError;

/// Host platform family the binary distribution is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformProfile {
    Windows,
    Unix,
}

impl PlatformProfile {
    /// Profile for the operating system this process runs on.
    pub fn detect() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Profile for an OS identifier as reported by `std::env::consts::OS`.
    pub fn for_os(os: &str) -> Self {
        if os == "windows" {
            PlatformProfile::Windows
        } else {
            PlatformProfile::Unix
        }
    }

    /// Token embedded in platform-specific companion artifact names.
    pub fn binary_suffix(&self) -> &'static str {
        match self {
            PlatformProfile::Windows => "windows.exe",
            PlatformProfile::Unix => "linux",
        }
    }

    /// Extension of native shared libraries, including the dot.
    pub fn shared_lib_ext(&self) -> &'static str {
        match self {
            PlatformProfile::Windows => ".dll",
            PlatformProfile::Unix => ".so",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformProfile::Windows)
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformProfile::Windows => f.write_str("windows"),
            PlatformProfile::Unix => f.write_str("unix"),
        }
    }
}

impl FromStr for PlatformProfile {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(PlatformProfile::Windows),
            "unix" | "linux" => Ok(PlatformProfile::Unix),
            other => Err(StampError::config(format!(
                "unknown platform '{}', expected 'windows' or 'unix'",
                other
            ))),
        }
    }
}

use thiserror::Error;

/// Unified error type for dist-stamp operations
#[derive(Error, Debug)]
pub enum StampError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Configuration error: cannot specify {first} and {second} in the same command, run one command at a time"
    )]
    ConflictingModes { first: String, second: String },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Version control error: {0}")]
    Vcs(String),

    #[error("Install probe failed: {0}")]
    Probe(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Convenience type alias for Results in dist-stamp
pub type Result<T> = std::result::Result<T, StampError>;

impl StampError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        StampError::Config(msg.into())
    }

    /// Create a metadata error with context
    pub fn metadata(msg: impl Into<String>) -> Self {
        StampError::Metadata(msg.into())
    }

    /// Create a version control error with context
    pub fn vcs(msg: impl Into<String>) -> Self {
        StampError::Vcs(msg.into())
    }

    /// Create an install probe error with context
    pub fn probe(msg: impl Into<String>) -> Self {
        StampError::Probe(msg.into())
    }

    pub fn conflicting_modes(first: impl Into<String>, second: impl Into<String>) -> Self {
        StampError::ConflictingModes {
            first: first.into(),
            second: second.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StampError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_conflicting_modes_names_both() {
        let err = StampError::conflicting_modes("bdist_wheel", "sdist");
        let msg = err.to_string();
        assert!(msg.contains("bdist_wheel"));
        assert!(msg.contains("sdist"));
        assert!(msg.starts_with("Configuration error"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StampError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (StampError::config("x"), "Configuration error"),
            (StampError::metadata("x"), "Metadata error"),
            (StampError::vcs("x"), "Version control error"),
            (StampError::probe("x"), "Install probe failed"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}

use std::cell::Cell;

use crate::error::{Result, StampError};
use crate::git::CommitSource;

/// Mock commit source for testing without a checkout
pub struct MockCommitSource {
    commit: Option<String>,
    calls: Cell<usize>,
}

impl MockCommitSource {
    /// A source that reports `commit` as HEAD
    pub fn with_commit(commit: impl Into<String>) -> Self {
        MockCommitSource {
            commit: Some(commit.into()),
            calls: Cell::new(0),
        }
    }

    /// A source that always fails, like a missing tool or checkout
    pub fn failing() -> Self {
        MockCommitSource {
            commit: None,
            calls: Cell::new(0),
        }
    }

    /// How many times HEAD was requested
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl CommitSource for MockCommitSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn head_commit(&self) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.commit
            .clone()
            .ok_or_else(|| StampError::vcs("mock source has no commit"))
    }
}

//! Read-only checkout introspection
//!
//! This module provides a trait-based abstraction over the ways the current
//! commit of a checkout can be obtained, so the resolver can try them in
//! order and tests can substitute a mock.
//!
//! # Overview
//!
//! - [command::GitCommand]: asks the `git` executable (`rev-parse HEAD`)
//! - [refs::RefFiles]: reads `.git/HEAD` and the ref it points at directly
//! - [mock::MockCommitSource]: canned answers for testing
//!
//! # Usage
//!
//! ```rust
//! # use dist_stamp::git::{CommitSource, RefFiles};
//! # use std::path::Path;
//! let refs = RefFiles::discover(Path::new("."));
//! match refs.head_commit() {
//!     Ok(commit) => println!("HEAD is at {}", commit),
//!     Err(e) => println!("no checkout: {}", e),
//! }
//! ```

pub mod command;
pub mod mock;
pub mod refs;

pub use command::GitCommand;
pub use mock::MockCommitSource;
pub use refs::RefFiles;

use crate::error::Result;

/// How HEAD identifies the checked-out commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadKind {
    /// HEAD points at a branch ref, e.g. `refs/heads/main`.
    Symbolic(String),
    /// HEAD holds a commit id directly.
    Detached,
}

/// State of a checkout as seen through its on-disk files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    /// Full commit id of HEAD.
    pub commit: String,
    pub head: HeadKind,
}

impl RepoState {
    pub fn is_detached(&self) -> bool {
        self.head == HeadKind::Detached
    }
}

/// A way of finding the commit the checkout is at.
///
/// Implementations report every failure (tool missing, no checkout,
/// malformed files) as an error; callers decide how to degrade.
pub trait CommitSource {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Full commit id of HEAD.
    fn head_commit(&self) -> Result<String>;
}

impl<T: CommitSource + ?Sized> CommitSource for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn head_commit(&self) -> Result<String> {
        (**self).head_commit()
    }
}

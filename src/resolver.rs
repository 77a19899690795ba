//! Resolution of the version a build reports.
//!
//! Release versions pass through untouched. Development versions get a
//! local segment: `+editable` for developer installs, otherwise the short id
//! of the commit being built. Failing to find that commit never fails the
//! build; the bare base version is reported instead.

use std::path::Path;

use crate::config::VcsConfig;
use crate::context::CommandContext;
use crate::git::{CommitSource, GitCommand, RefFiles};
use crate::version::{BaseVersion, LocalSuffix, ResolvedVersion};

/// Resolves versions against an ordered list of commit sources.
pub struct VersionResolver<'a> {
    sources: Vec<Box<dyn CommitSource + 'a>>,
}

impl<'a> VersionResolver<'a> {
    /// Sources are tried in order until one yields a usable commit id.
    pub fn new(sources: Vec<Box<dyn CommitSource + 'a>>) -> Self {
        VersionResolver { sources }
    }

    /// The standard lookup for a checkout: the VCS tool first, then the ref
    /// files on disk.
    pub fn for_checkout(repo_root: &Path, vcs: &VcsConfig) -> Self {
        VersionResolver::new(vec![
            Box::new(GitCommand::from_config(vcs, repo_root)),
            Box::new(RefFiles::discover(repo_root)),
        ])
    }

    pub fn resolve(&self, base: &BaseVersion, context: &CommandContext) -> ResolvedVersion {
        if !base.is_development() {
            return ResolvedVersion::unchanged(base);
        }

        let Some(suffix) = self.suffix_candidate(context) else {
            tracing::debug!(%base, "no local version data available");
            return ResolvedVersion::unchanged(base);
        };

        if base.as_str().ends_with(suffix.as_str()) {
            return ResolvedVersion::unchanged(base);
        }

        ResolvedVersion::with_suffix(base, &suffix)
    }

    fn suffix_candidate(&self, context: &CommandContext) -> Option<LocalSuffix> {
        if context.is_editable() {
            return Some(LocalSuffix::Editable);
        }
        self.sources.iter().find_map(|source| {
            let commit = match source.head_commit() {
                Ok(commit) => commit,
                Err(e) => {
                    tracing::debug!(source = source.name(), error = %e, "commit lookup failed");
                    return None;
                }
            };
            let suffix = LocalSuffix::from_commit(&commit);
            if suffix.is_none() {
                tracing::debug!(source = source.name(), %commit, "malformed commit id");
            }
            suffix
        })
    }
}

/// Resolves `base` for a build of the checkout at `repo_root`.
pub fn resolve(
    base: &BaseVersion,
    context: &CommandContext,
    repo_root: &Path,
    vcs: &VcsConfig,
) -> ResolvedVersion {
    VersionResolver::for_checkout(repo_root, vcs).resolve(base, context)
}

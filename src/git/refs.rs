use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StampError};
use crate::git::{CommitSource, HeadKind, RepoState};

/// Reads HEAD straight from a checkout's internal files.
///
/// Used when the `git` executable is unavailable. Understands loose refs,
/// `packed-refs`, `.git` files (`gitdir: ...`) and linked worktrees
/// (`commondir`).
#[derive(Debug, Clone, PartialEq)]
pub struct RefFiles {
    git_dir: PathBuf,
}

impl RefFiles {
    /// Uses an explicit git directory.
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        RefFiles {
            git_dir: git_dir.into(),
        }
    }

    /// Locates the git directory of the checkout rooted at `root`.
    ///
    /// Never fails: an unreadable `.git` file leaves the plain `.git` path in
    /// place and the error shows up when HEAD is read.
    pub fn discover(root: &Path) -> Self {
        let dot_git = root.join(".git");
        if dot_git.is_file() {
            if let Ok(content) = fs::read_to_string(&dot_git) {
                if let Some(target) = content.trim().strip_prefix("gitdir:") {
                    return RefFiles::new(root.join(target.trim()));
                }
            }
        }
        RefFiles::new(dot_git)
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Reads HEAD and follows it to a commit id.
    pub fn read_state(&self) -> Result<RepoState> {
        let head = first_line(&self.git_dir.join("HEAD"))?;

        match head.strip_prefix("ref:") {
            Some(reference) => {
                let reference = reference.trim();
                let commit = self.resolve_ref(reference)?;
                Ok(RepoState {
                    commit,
                    head: HeadKind::Symbolic(reference.to_string()),
                })
            }
            None => Ok(RepoState {
                commit: head,
                head: HeadKind::Detached,
            }),
        }
    }

    /// Directory holding refs shared between worktrees.
    fn common_dir(&self) -> PathBuf {
        match first_line(&self.git_dir.join("commondir")) {
            Ok(common) => self.git_dir.join(common),
            Err(_) => self.git_dir.clone(),
        }
    }

    fn resolve_ref(&self, reference: &str) -> Result<String> {
        if reference.is_empty() || reference.split('/').any(|part| part == "..") {
            return Err(StampError::vcs(format!("malformed ref '{}' in HEAD", reference)));
        }

        let mut roots = vec![self.git_dir.clone()];
        let common = self.common_dir();
        if common != self.git_dir {
            roots.push(common.clone());
        }

        for root in &roots {
            if let Ok(commit) = first_line(&root.join(reference)) {
                return Ok(commit);
            }
        }

        packed_ref(&common, reference)?.ok_or_else(|| {
            StampError::vcs(format!("ref '{}' not found in {}", reference, common.display()))
        })
    }
}

impl CommitSource for RefFiles {
    fn name(&self) -> &'static str {
        "ref files"
    }

    fn head_commit(&self) -> Result<String> {
        self.read_state().map(|state| state.commit)
    }
}

fn first_line(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .map_err(|e| StampError::vcs(format!("cannot read {}: {}", path.display(), e)))?;
    let line = content.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(StampError::vcs(format!("{} is empty", path.display())));
    }
    Ok(line.to_string())
}

/// Looks `reference` up in `packed-refs`, if that file exists.
fn packed_ref(git_dir: &Path, reference: &str) -> Result<Option<String>> {
    let path = git_dir.join("packed-refs");
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .map_err(|e| StampError::vcs(format!("cannot read {}: {}", path.display(), e)))?;

    let found = content
        .lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
        .filter_map(|line| line.split_once(' '))
        .find(|(_, name)| name.trim() == reference)
        .map(|(commit, _)| commit.to_string());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_symbolic_head() {
        let dir = TempDir::new().unwrap();
        let git = dir.path().join(".git");
        write(&git.join("HEAD"), "ref: refs/heads/main\n");
        write(&git.join("refs/heads/main"), &format!("{}\n", SHA));

        let state = RefFiles::discover(dir.path()).read_state().unwrap();
        assert_eq!(state.commit, SHA);
        assert_eq!(state.head, HeadKind::Symbolic("refs/heads/main".to_string()));
        assert!(!state.is_detached());
    }

    #[test]
    fn test_detached_head() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".git/HEAD"), &format!("{}\n", SHA));

        let state = RefFiles::discover(dir.path()).read_state().unwrap();
        assert_eq!(state.commit, SHA);
        assert!(state.is_detached());
    }

    #[test]
    fn test_packed_ref_fallback() {
        let dir = TempDir::new().unwrap();
        let git = dir.path().join(".git");
        write(&git.join("HEAD"), "ref: refs/heads/release\n");
        write(
            &git.join("packed-refs"),
            &format!(
                "# pack-refs with: peeled fully-peeled sorted \n\
                 ffffffffffffffffffffffffffffffffffffffff refs/heads/main\n\
                 {} refs/heads/release\n\
                 ^eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee\n",
                SHA
            ),
        );

        assert_eq!(RefFiles::discover(dir.path()).head_commit().unwrap(), SHA);
    }

    #[test]
    fn test_gitdir_file() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("modules/pkg");
        write(&real.join("HEAD"), "ref: refs/heads/main\n");
        write(&real.join("refs/heads/main"), SHA);
        write(&dir.path().join(".git"), "gitdir: modules/pkg\n");

        let refs = RefFiles::discover(dir.path());
        assert_eq!(refs.git_dir(), dir.path().join("modules/pkg"));
        assert_eq!(refs.head_commit().unwrap(), SHA);
    }

    #[test]
    fn test_worktree_commondir() {
        let dir = TempDir::new().unwrap();
        let main_git = dir.path().join("main/.git");
        let wt_git = main_git.join("worktrees/feature");
        write(&wt_git.join("HEAD"), "ref: refs/heads/feature\n");
        write(&wt_git.join("commondir"), "../..\n");
        write(&main_git.join("refs/heads/feature"), SHA);

        assert_eq!(RefFiles::new(&wt_git).head_commit().unwrap(), SHA);
    }

    #[test]
    fn test_missing_checkout() {
        let dir = TempDir::new().unwrap();
        assert!(RefFiles::discover(dir.path()).read_state().is_err());
    }

    #[test]
    fn test_dangling_ref() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".git/HEAD"), "ref: refs/heads/gone\n");
        assert!(RefFiles::discover(dir.path()).head_commit().is_err());
    }

    #[test]
    fn test_ref_escaping_git_dir_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".git/HEAD"), "ref: ../../etc/passwd\n");
        assert!(RefFiles::discover(dir.path()).head_commit().is_err());
    }

    #[test]
    fn test_empty_head() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(".git/HEAD"), "\n");
        assert!(RefFiles::discover(dir.path()).head_commit().is_err());
    }
}

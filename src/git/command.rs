use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use crate::config::VcsConfig;
use crate::error::{Result, StampError};
use crate::git::CommitSource;
use crate::process::run_bounded;

/// Obtains HEAD by running the version-control executable.
pub struct GitCommand {
    program: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl GitCommand {
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        GitCommand {
            program: program.into(),
            work_dir: work_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &VcsConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self::new(config.program.clone(), work_dir, config.timeout())
    }
}

impl CommitSource for GitCommand {
    fn name(&self) -> &'static str {
        "git rev-parse"
    }

    fn head_commit(&self) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["rev-parse", "HEAD"]).current_dir(&self.work_dir);

        let output = run_bounded(cmd, self.timeout)
            .map_err(|e| StampError::vcs(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(StampError::vcs(format!(
                "{} rev-parse HEAD exited with {}",
                self.program, output.status
            )));
        }

        let commit = output.stdout.trim();
        if commit.is_empty() {
            return Err(StampError::vcs("rev-parse HEAD printed nothing"));
        }
        Ok(commit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_error() {
        let git = GitCommand::new(
            "dist-stamp-no-such-vcs",
            std::env::temp_dir(),
            Duration::from_secs(1),
        );
        let err = git.head_commit().unwrap_err();
        assert!(err.to_string().contains("Version control error"));
    }

    #[test]
    fn test_missing_work_dir_is_error() {
        let git = GitCommand::new(
            "git",
            "/nonexistent/dist-stamp/checkout",
            Duration::from_secs(1),
        );
        assert!(git.head_commit().is_err());
    }

    /// A fake VCS: `sh rev-parse HEAD` runs the `rev-parse` script in the
    /// work dir, so nothing freshly written is exec'd directly.
    #[cfg(unix)]
    fn fake_vcs(script: &str) -> (tempfile::TempDir, GitCommand) {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("rev-parse"), script).unwrap();
        let git = GitCommand::new("sh", dir.path(), Duration::from_secs(10));
        (dir, git)
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_tool_output() {
        let (_dir, git) = fake_vcs("echo abcdef1234567890abcdef1234567890abcdef12\n");
        assert_eq!(
            git.head_commit().unwrap(),
            "abcdef1234567890abcdef1234567890abcdef12"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_error() {
        let (_dir, git) = fake_vcs("echo fatal: not a git repository >&2\nexit 128\n");
        assert!(git.head_commit().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_tool_times_out() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("rev-parse"), "sleep 30\n").unwrap();
        let git = GitCommand::new("sh", dir.path(), Duration::from_millis(100));
        let err = git.head_commit().unwrap_err();
        assert!(err.to_string().contains("did not finish"));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_child_holding_stdout_times_out() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("rev-parse"),
            "sleep 30 &\necho abcdef1234567890abcdef1234567890abcdef12\n",
        )
        .unwrap();
        let git = GitCommand::new("sh", dir.path(), Duration::from_millis(200));
        let started = std::time::Instant::now();
        assert!(git.head_commit().is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}

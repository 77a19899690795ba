//! Post-install consistency patch.
//!
//! After a development build is installed, the installed copy of the
//! metadata file still declares the bare base version. The stamper rewrites
//! that one declaration so the installed package reports the resolved
//! version. This is best effort: every failure becomes a skip.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::config::{ProjectConfig, StampConfig};
use crate::context::CommandContext;
use crate::error::{Result, StampError};
use crate::metadata::MetadataFile;
use crate::process::run_bounded;
use crate::version::ResolvedVersion;

/// Finds where a package was installed.
pub trait InstallProbe {
    /// Path of the installed metadata file of `import_name`.
    fn locate(&self, import_name: &str) -> Result<PathBuf>;
}

/// Asks an interpreter to import the package and report its file.
pub struct InterpreterProbe {
    interpreter: PathBuf,
    timeout: Duration,
}

impl InterpreterProbe {
    pub fn new(interpreter: impl Into<PathBuf>, timeout: Duration) -> Self {
        InterpreterProbe {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn from_config(config: &StampConfig) -> Self {
        Self::new(config.python.clone(), config.probe_timeout())
    }

    /// Runs outside the checkout so the import resolves to the installed copy.
    fn probe_dir(&self) -> PathBuf {
        match self.interpreter.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => std::env::temp_dir(),
        }
    }
}

impl InstallProbe for InterpreterProbe {
    fn locate(&self, import_name: &str) -> Result<PathBuf> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c")
            .arg(format!("import {} as p; print(p.__file__)", import_name))
            .current_dir(self.probe_dir());

        let output = run_bounded(cmd, self.timeout).map_err(|e| {
            StampError::probe(format!("cannot run {}: {}", self.interpreter.display(), e))
        })?;
        if !output.status.success() {
            return Err(StampError::probe(format!(
                "{} could not import {} ({})",
                self.interpreter.display(),
                import_name,
                output.status
            )));
        }

        let path = output.stdout.trim();
        if path.is_empty() {
            return Err(StampError::probe("interpreter reported no package file"));
        }
        Ok(PathBuf::from(path))
    }
}

/// Why nothing was stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Release version, or a development version without local data.
    NoLocalVersion,
    /// Editable installs keep the human-maintained declaration.
    Editable,
    /// Neither a direct install nor egg metadata generation.
    NotAnInstall,
    ProbeFailed(String),
    FileMissing(PathBuf),
    NoDeclaration(PathBuf),
    WriteFailed(String),
}

impl SkipReason {
    /// Expected skips are silent; the rest point at a failed patch.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SkipReason::ProbeFailed(_)
                | SkipReason::FileMissing(_)
                | SkipReason::NoDeclaration(_)
                | SkipReason::WriteFailed(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoLocalVersion => write!(f, "version has no local segment"),
            SkipReason::Editable => write!(f, "editable install"),
            SkipReason::NotAnInstall => write!(f, "not an install command"),
            SkipReason::ProbeFailed(reason) => write!(f, "install location unknown: {}", reason),
            SkipReason::FileMissing(path) => write!(f, "{} does not exist", path.display()),
            SkipReason::NoDeclaration(path) => {
                write!(f, "{} has no version declaration", path.display())
            }
            SkipReason::WriteFailed(reason) => write!(f, "rewrite failed: {}", reason),
        }
    }
}

/// Result of a stamping attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampOutcome {
    Stamped(PathBuf),
    Skipped(SkipReason),
}

/// Rewrites the installed metadata file to the resolved version.
///
/// `root` is the directory the host command runs in; a relative script path
/// is resolved against it.
pub struct PostInstallStamper<'a> {
    project: &'a ProjectConfig,
    root: &'a Path,
    probe: &'a dyn InstallProbe,
}

impl<'a> PostInstallStamper<'a> {
    pub fn new(project: &'a ProjectConfig, root: &'a Path, probe: &'a dyn InstallProbe) -> Self {
        PostInstallStamper {
            project,
            root,
            probe,
        }
    }

    pub fn stamp(&self, resolved: &ResolvedVersion, context: &CommandContext) -> StampOutcome {
        let outcome = self.try_stamp(resolved, context);
        match &outcome {
            StampOutcome::Stamped(path) => {
                tracing::info!(path = %path.display(), version = %resolved, "stamped installed metadata")
            }
            StampOutcome::Skipped(reason) if reason.is_failure() => {
                tracing::debug!(%reason, "stamping skipped")
            }
            StampOutcome::Skipped(_) => {}
        }
        outcome
    }

    fn try_stamp(&self, resolved: &ResolvedVersion, context: &CommandContext) -> StampOutcome {
        if resolved.local_segment().is_none() {
            return StampOutcome::Skipped(SkipReason::NoLocalVersion);
        }
        if resolved.is_editable() {
            return StampOutcome::Skipped(SkipReason::Editable);
        }
        if !resolved.needs_stamp() {
            return StampOutcome::Skipped(SkipReason::NoLocalVersion);
        }

        let target = match self.target(context) {
            Ok(Some(path)) => path,
            Ok(None) => return StampOutcome::Skipped(SkipReason::NotAnInstall),
            Err(e) => return StampOutcome::Skipped(SkipReason::ProbeFailed(e.to_string())),
        };

        if !target.is_file() {
            return StampOutcome::Skipped(SkipReason::FileMissing(target));
        }

        match MetadataFile::new(&target).rewrite(&self.project.version_key, resolved.as_str()) {
            Ok(true) => StampOutcome::Stamped(target),
            Ok(false) => StampOutcome::Skipped(SkipReason::NoDeclaration(target)),
            Err(e) => StampOutcome::Skipped(SkipReason::WriteFailed(e.to_string())),
        }
    }

    /// The installed metadata file for this command, if it installs anything.
    fn target(&self, context: &CommandContext) -> Result<Option<PathBuf>> {
        if context.is_direct_install() {
            return self.probe.locate(&self.project.import_name).map(Some);
        }
        if context.is_egg_info() {
            return Ok(context
                .script_dir()
                .map(|dir| egg_info_target(self.root, &dir, &self.project.metadata_file)));
        }
        Ok(None)
    }
}

fn egg_info_target(root: &Path, script_dir: &Path, metadata_file: &Path) -> PathBuf {
    if script_dir == Path::new(".") {
        return root.join(metadata_file);
    }
    root.join(script_dir).join(metadata_file)
}

//! Build pipeline orchestration
//!
//! Wires the components in the order a packaging command needs them:
//! resolve the version, write the manifest, run the host packaging command,
//! then stamp the installed metadata. Keeps the business logic apart from
//! CLI argument parsing so it can be driven programmatically.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::sync::OnceLock;

use crate::config::Config;
use crate::context::CommandContext;
use crate::error::Result;
use crate::manifest::{self, ManifestRule};
use crate::metadata::MetadataFile;
use crate::platform::PlatformProfile;
use crate::resolver::VersionResolver;
use crate::stamper::{InstallProbe, PostInstallStamper, StampOutcome};
use crate::version::{BaseVersion, ResolvedVersion};
use crate::warning::BuildWarning;

/// Environment variable carrying the resolved version into the host command.
pub const VERSION_ENV: &str = "DIST_STAMP_VERSION";

/// Result of a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub version: ResolvedVersion,

    /// Manifest written for this run, if a distribution was requested
    pub manifest: Option<PathBuf>,

    /// Exit status of the host packaging command
    pub host_status: ExitStatus,

    /// Stamping outcome; `None` when the host command failed
    pub stamp: Option<StampOutcome>,

    pub warnings: Vec<BuildWarning>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.host_status.success()
    }
}

/// One packaging invocation.
///
/// The resolved version is computed on first use and reused by every later
/// step of the same run.
pub struct Pipeline<'a> {
    config: Config,
    root: PathBuf,
    host_args: Vec<String>,
    context: CommandContext,
    profile: PlatformProfile,
    resolver: VersionResolver<'a>,
    version: OnceLock<ResolvedVersion>,
}

impl<'a> Pipeline<'a> {
    /// `host_args` are the host command's arguments, script path first.
    pub fn new(
        config: Config,
        root: impl Into<PathBuf>,
        host_args: Vec<String>,
        profile: PlatformProfile,
    ) -> Self {
        let root = root.into();
        let resolver = VersionResolver::for_checkout(&root, &config.vcs);
        let context = CommandContext::from_args(&host_args);
        Pipeline {
            config,
            root,
            host_args,
            context,
            profile,
            resolver,
            version: OnceLock::new(),
        }
    }

    /// Replaces the checkout lookup, e.g. with a mock in tests.
    pub fn with_resolver(mut self, resolver: VersionResolver<'a>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.config.manifest.path)
    }

    pub fn base_version(&self) -> Result<BaseVersion> {
        MetadataFile::new(self.root.join(&self.config.project.metadata_file))
            .base_version(&self.config.project.version_key)
    }

    /// The resolved version for this run.
    pub fn version(&self) -> Result<&ResolvedVersion> {
        if let Some(resolved) = self.version.get() {
            return Ok(resolved);
        }
        let base = self.base_version()?;
        let resolved = self.resolver.resolve(&base, &self.context);
        tracing::info!(%base, %resolved, "resolved version");
        Ok(self.version.get_or_init(|| resolved))
    }

    /// Writes the manifest for the requested distribution, if any.
    pub fn write_manifest(&self) -> Result<Option<Vec<ManifestRule>>> {
        manifest::generate(
            &self.context,
            self.profile,
            &self.config.manifest,
            &self.manifest_path(),
        )
    }

    /// Runs the host packaging command with the resolved version exported.
    pub fn run_host(&self, program: &str) -> Result<ExitStatus> {
        let version = self.version()?;
        tracing::info!(program, args = ?self.host_args, "running host command");
        let status = Command::new(program)
            .args(&self.host_args)
            .current_dir(&self.root)
            .env(VERSION_ENV, version.as_str())
            .status()?;
        Ok(status)
    }

    /// Brings the installed metadata in line with the resolved version.
    pub fn stamp(&self, probe: &dyn InstallProbe) -> Result<StampOutcome> {
        let version = self.version()?;
        let stamper = PostInstallStamper::new(&self.config.project, &self.root, probe);
        Ok(stamper.stamp(version, &self.context))
    }

    /// Full run: resolve, write the manifest, run the host, stamp on success.
    pub fn run(&self, program: &str, probe: &dyn InstallProbe) -> Result<PipelineReport> {
        let mut warnings = Vec::new();

        let version = self.version()?.clone();
        if let Some(warning) = self.version_warning()? {
            warnings.push(warning);
        }

        let manifest = match self.write_manifest()? {
            Some(_) => Some(self.manifest_path()),
            None => {
                tracing::debug!(
                    path = %self.manifest_path().display(),
                    "no distribution requested, manifest left alone"
                );
                None
            }
        };

        let host_status = self.run_host(program)?;
        let stamp = if host_status.success() {
            let outcome = self.stamp(probe)?;
            if let StampOutcome::Skipped(reason) = &outcome {
                if reason.is_failure() {
                    warnings.push(BuildWarning::StampSkipped {
                        reason: reason.clone(),
                    });
                }
            }
            Some(outcome)
        } else {
            tracing::warn!(%host_status, "host command failed, not stamping");
            None
        };

        Ok(PipelineReport {
            version,
            manifest,
            host_status,
            stamp,
            warnings,
        })
    }

    /// Warns when a development version could not be qualified.
    pub fn version_warning(&self) -> Result<Option<BuildWarning>> {
        let version = self.version()?;
        let base = self.base_version()?;
        if base.is_development() && version.local_segment().is_none() {
            return Ok(Some(BuildWarning::NoLocalVersion {
                base: base.to_string(),
            }));
        }
        Ok(None)
    }
}

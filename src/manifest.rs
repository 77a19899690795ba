//! Generation of the packaging manifest.
//!
//! A binary distribution carries only the compiled companions for the host
//! platform; a source distribution carries the foreign-language sources and
//! native libraries for every platform, minus the prebuilt companions.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::ManifestConfig;
use crate::context::{CommandContext, BINARY_DIST, SOURCE_DIST};
use crate::error::{Result, StampError};
use crate::platform::PlatformProfile;

/// First line of every generated manifest.
pub const HEADER: &str = "# This file is automatically generated. Do not modify.";

/// Which distribution the manifest is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionMode {
    Binary,
    Source,
}

impl DistributionMode {
    /// Picks the mode requested by `context`.
    ///
    /// Returns `Ok(None)` when neither is requested and an error when both are.
    pub fn select(context: &CommandContext) -> Result<Option<Self>> {
        match (context.wants_binary_dist(), context.wants_source_dist()) {
            (true, true) => Err(StampError::conflicting_modes(BINARY_DIST, SOURCE_DIST)),
            (true, false) => Ok(Some(DistributionMode::Binary)),
            (false, true) => Ok(Some(DistributionMode::Source)),
            (false, false) => Ok(None),
        }
    }
}

/// One directive of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestRule {
    /// Files matching any pattern, relative to the project root.
    Include(Vec<String>),
    /// Removes files matched by earlier rules.
    Exclude(Vec<String>),
    /// Files under `dir`, at any depth, matching any pattern.
    RecursiveInclude { dir: String, patterns: Vec<String> },
}

impl ManifestRule {
    fn include(path: impl Into<String>) -> Self {
        ManifestRule::Include(vec![path.into()])
    }

    fn exclude(path: impl Into<String>) -> Self {
        ManifestRule::Exclude(vec![path.into()])
    }

    fn recursive(dir: &str, patterns: Vec<String>) -> Self {
        ManifestRule::RecursiveInclude {
            dir: dir.to_string(),
            patterns,
        }
    }

    pub fn is_exclusion(&self) -> bool {
        matches!(self, ManifestRule::Exclude(_))
    }
}

impl fmt::Display for ManifestRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestRule::Include(patterns) => write!(f, "include {}", patterns.join(" ")),
            ManifestRule::Exclude(patterns) => write!(f, "exclude {}", patterns.join(" ")),
            ManifestRule::RecursiveInclude { dir, patterns } => {
                write!(f, "recursive-include {} {}", dir, patterns.join(" "))
            }
        }
    }
}

/// Rules for `mode` on `profile`, in the order they must be written.
pub fn rules(
    mode: DistributionMode,
    profile: PlatformProfile,
    layout: &ManifestConfig,
) -> Vec<ManifestRule> {
    match mode {
        DistributionMode::Binary => binary_rules(profile, layout),
        DistributionMode::Source => source_rules(layout),
    }
}

fn binary_rules(profile: PlatformProfile, layout: &ManifestConfig) -> Vec<ManifestRule> {
    let mut rules = vec![ManifestRule::recursive(
        &layout.examples_dir,
        layout.example_patterns.clone(),
    )];
    rules.extend(layout.binary_includes.iter().map(ManifestRule::include));
    rules.extend(layout.companions.iter().map(|companion| {
        ManifestRule::recursive(
            &layout.library_dir,
            vec![format!("{}-{}*", companion, profile.binary_suffix())],
        )
    }));
    rules.push(ManifestRule::recursive(
        &layout.examples_dir,
        vec![format!("*{}", profile.shared_lib_ext())],
    ));
    if profile.is_windows() {
        rules.push(ManifestRule::include(windows_utility(layout)));
    }
    rules
}

fn source_rules(layout: &ManifestConfig) -> Vec<ManifestRule> {
    let mut rules = vec![
        ManifestRule::recursive(&layout.package_dir, layout.source_patterns.clone()),
        ManifestRule::include(windows_utility(layout)),
    ];
    rules.extend(
        layout
            .companions
            .iter()
            .map(|companion| ManifestRule::exclude(format!("{}/{}-*", layout.library_dir, companion))),
    );
    rules
}

fn windows_utility(layout: &ManifestConfig) -> String {
    format!("{}/{}", layout.library_dir, layout.windows_utility)
}

/// Renders the manifest file content, header first.
pub fn render(rules: &[ManifestRule]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for rule in rules {
        out.push_str(&rule.to_string());
        out.push('\n');
    }
    out
}

/// Generates the manifest for `context` and writes it to `path`.
///
/// Returns `Ok(None)` without touching `path` when no distribution is being
/// built. Conflicting modes are rejected before anything is written.
pub fn generate(
    context: &CommandContext,
    profile: PlatformProfile,
    layout: &ManifestConfig,
    path: &Path,
) -> Result<Option<Vec<ManifestRule>>> {
    let Some(mode) = DistributionMode::select(context)? else {
        tracing::debug!("no distribution requested, manifest left untouched");
        return Ok(None);
    };

    let rules = rules(mode, profile, layout);
    fs::write(path, render(&rules))?;
    tracing::info!(path = %path.display(), ?mode, %profile, rules = rules.len(), "wrote manifest");
    Ok(Some(rules))
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "diststamp.toml";

/// Name of the per-user configuration file inside the user config directory.
pub const USER_CONFIG_FILE_NAME: &str = ".diststamp.toml";

/// Represents the complete configuration for dist-stamp.
///
/// Describes where the package declares its version, how the checkout is
/// inspected, how the installed copy is located and which files the manifest
/// bundles.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub vcs: VcsConfig,

    #[serde(default)]
    pub stamp: StampConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from("msl/loadlib/__init__.py")
}

fn default_version_key() -> String {
    "__version__".to_string()
}

fn default_import_name() -> String {
    "msl.loadlib".to_string()
}

/// Where the package declares its metadata.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProjectConfig {
    /// Metadata source file, relative to the project root.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: PathBuf,

    /// Name of the version declaration inside the metadata file.
    #[serde(default = "default_version_key")]
    pub version_key: String,

    /// Import name used to ask an interpreter where the package was installed.
    #[serde(default = "default_import_name")]
    pub import_name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            metadata_file: default_metadata_file(),
            version_key: default_version_key(),
            import_name: default_import_name(),
        }
    }
}

fn default_vcs_program() -> String {
    "git".to_string()
}

fn default_vcs_timeout_ms() -> u64 {
    5_000
}

/// Version-control introspection settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VcsConfig {
    #[serde(default = "default_vcs_program")]
    pub program: String,

    #[serde(default = "default_vcs_timeout_ms")]
    pub timeout_ms: u64,
}

impl VcsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for VcsConfig {
    fn default() -> Self {
        VcsConfig {
            program: default_vcs_program(),
            timeout_ms: default_vcs_timeout_ms(),
        }
    }
}

fn default_python() -> PathBuf {
    PathBuf::from("python")
}

fn default_probe_timeout_ms() -> u64 {
    30_000
}

/// Post-install stamping settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StampConfig {
    /// Interpreter used to locate the installed package.
    #[serde(default = "default_python")]
    pub python: PathBuf,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl StampConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        StampConfig {
            python: default_python(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("MANIFEST.in")
}

fn default_package_dir() -> String {
    "msl".to_string()
}

fn default_library_dir() -> String {
    "msl/loadlib".to_string()
}

fn default_examples_dir() -> String {
    "msl/examples/loadlib".to_string()
}

fn default_companions() -> Vec<String> {
    vec!["server32".to_string()]
}

fn default_windows_utility() -> String {
    "verpatch.exe".to_string()
}

fn default_example_patterns() -> Vec<String> {
    vec!["*.jar".to_string(), "*.class".to_string()]
}

fn default_binary_includes() -> Vec<String> {
    vec![
        "msl/loadlib/py4j-wrapper.jar".to_string(),
        "msl/examples/loadlib/dotnet_lib32.dll".to_string(),
        "msl/examples/loadlib/dotnet_lib64.dll".to_string(),
    ]
}

fn default_source_patterns() -> Vec<String> {
    [
        "*.cpp", "*.h", "*.cs", "*.f90", "*.java", "*.jar", "*.class", "*.so", "*.dll", "*.txt",
        "*.dylib",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

/// Layout of the files the manifest bundles.
///
/// The binary and source policies are fixed; this table only names the
/// directories and patterns they are applied to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManifestConfig {
    /// Manifest artifact, relative to the project root.
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,

    #[serde(default = "default_package_dir")]
    pub package_dir: String,

    #[serde(default = "default_library_dir")]
    pub library_dir: String,

    #[serde(default = "default_examples_dir")]
    pub examples_dir: String,

    /// Companion runtimes shipped as `<name>-<binary suffix>*` artifacts.
    #[serde(default = "default_companions")]
    pub companions: Vec<String>,

    /// Auxiliary utility that only a Windows binary distribution carries.
    #[serde(default = "default_windows_utility")]
    pub windows_utility: String,

    #[serde(default = "default_example_patterns")]
    pub example_patterns: Vec<String>,

    #[serde(default = "default_binary_includes")]
    pub binary_includes: Vec<String>,

    #[serde(default = "default_source_patterns")]
    pub source_patterns: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            path: default_manifest_path(),
            package_dir: default_package_dir(),
            library_dir: default_library_dir(),
            examples_dir: default_examples_dir(),
            companions: default_companions(),
            windows_utility: default_windows_utility(),
            example_patterns: default_example_patterns(),
            binary_includes: default_binary_includes(),
            source_patterns: default_source_patterns(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `diststamp.toml` in the project root
/// 3. `.diststamp.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>, project_root: &Path) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => find_config_file(project_root),
    };

    let Some(path) = path else {
        tracing::debug!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    tracing::debug!(path = %path.display(), "loading configuration");
    let config_str = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

fn find_config_file(project_root: &Path) -> Option<PathBuf> {
    let local = project_root.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join(USER_CONFIG_FILE_NAME);
    user.exists().then_some(user)
}

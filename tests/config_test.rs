use dist_stamp::StampError;
use dist_stamp::config::{load_config, Config, CONFIG_FILE_NAME};
use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(
        config.project.metadata_file,
        PathBuf::from("msl/loadlib/__init__.py")
    );
    assert_eq!(config.project.import_name, "msl.loadlib");
    assert_eq!(config.vcs.program, "git");
    assert_eq!(config.vcs.timeout(), Duration::from_secs(5));
    assert_eq!(config.stamp.python, PathBuf::from("python"));
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[project]
version_key = "VERSION"

[manifest]
companions = ["server32", "server64"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let root = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path().to_str().unwrap()), root.path()).unwrap();
    assert_eq!(config.project.version_key, "VERSION");
    assert_eq!(
        config.manifest.companions,
        vec!["server32".to_string(), "server64".to_string()]
    );
    // untouched tables keep their defaults
    assert_eq!(config.project.import_name, "msl.loadlib");
    assert_eq!(config.manifest.library_dir, "msl/loadlib");
}

#[test]
fn test_load_fixture_layout() {
    let config = load_config(
        Some("tests/fixtures/custom_layout.toml"),
        Path::new("."),
    )
    .expect("Failed to load test config");
    assert_eq!(
        config.project.metadata_file,
        PathBuf::from("src/widget/__init__.py")
    );
    assert_eq!(config.vcs.timeout_ms, 1500);
    assert_eq!(config.manifest.path, PathBuf::from("build/MANIFEST.in"));
    assert!(config.manifest.binary_includes.is_empty());
    assert_eq!(config.manifest.windows_utility, "stamp.exe");
    assert_eq!(config.stamp.probe_timeout_ms, 30_000);
}

#[test]
fn test_project_file_is_found() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join(CONFIG_FILE_NAME),
        "[vcs]\nprogram = \"jj-git\"\n",
    )
    .unwrap();

    let config = load_config(None, root.path()).unwrap();
    assert_eq!(config.vcs.program, "jj-git");
}

#[test]
fn test_invalid_file_is_error() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join(CONFIG_FILE_NAME), "[vcs\nprogram = ").unwrap();

    let err = load_config(None, root.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));
    assert!(matches!(err, StampError::ConfigParse(_)));
}

#[test]
fn test_missing_explicit_file_is_error() {
    let root = TempDir::new().unwrap();
    assert!(load_config(Some("/nonexistent/diststamp.toml"), root.path()).is_err());
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_fallback() {
    let root = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();
    std::fs::write(
        config_home.path().join(".diststamp.toml"),
        "[stamp]\npython = \"/usr/bin/python3\"\n",
    )
    .unwrap();

    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", config_home.path());
    let config = load_config(None, root.path());
    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(
        config.unwrap().stamp.python,
        PathBuf::from("/usr/bin/python3")
    );
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_no_config_anywhere_is_default() {
    let root = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();

    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", config_home.path());
    let config = load_config(None, root.path());
    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(config.unwrap(), Config::default());
}

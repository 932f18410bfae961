//! Integration tests for the config module
//!
//! - loader: TOML file I/O
//! - validator: configuration validation
//! - ConfigManager: resolution order (explicit -> project file -> defaults)

use freezepack::config::{loader, validator, BuildConfig, ConfigManager, DEFAULT_CONFIG_FILE};
use freezepack::error::ConfigError;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

// ============================================================================
// Configuration Loading
// ============================================================================

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("ci.toml");
    fs::write(
        &path,
        r#"
plugins = ["plugins/eddn.py"]

[product]
version = "5.13.0-beta2"

[installer]
sdk_path = 'D:\sdk\x64'
"#,
    )
    .unwrap();

    let config = loader::load_config_from_file(&path).unwrap();

    assert_eq!(config.product.version, "5.13.0-beta2");
    assert_eq!(config.product.app_name, "EDMarketConnector");
    assert_eq!(config.plugins, vec!["plugins/eddn.py".to_string()]);
    assert_eq!(config.installer.sdk_path, PathBuf::from(r"D:\sdk\x64"));
    assert_eq!(config.installer.default_locale, 1033);
    assert_eq!(config.freeze.optimize, 2);
}

#[test]
fn test_missing_file() {
    let temp_dir = tempdir().unwrap();
    let result = loader::load_config_from_file(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn test_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[product\nversion = ").unwrap();

    let result = loader::load_config_from_file(&path);
    assert!(matches!(result, Err(ConfigError::InvalidToml(_))));
}

#[test]
fn test_wrong_extension_rejected() {
    let result = loader::load_config_from_file(&PathBuf::from("freezepack.json"));
    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
}

// ============================================================================
// Configuration Saving
// ============================================================================

#[test]
fn test_save_and_reload_defaults() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("freezepack.toml");

    let original = loader::create_default_config();
    loader::save_config_to_file(&original, &path).unwrap();
    let reloaded = loader::load_config_from_file(&path).unwrap();

    // project_root is runtime-only and never written
    let mut expected = original;
    expected.project_root = reloaded.project_root.clone();
    assert_eq!(reloaded, expected);
}

// ============================================================================
// Configuration Validation
// ============================================================================

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = BuildConfig::default();
    config.freeze.optimize = 3;
    assert!(validator::validate_config(&config).is_err());

    let mut config = BuildConfig::default();
    config.installer.default_locale = 0;
    assert!(validator::validate_config(&config).is_err());

    let mut config = BuildConfig::default();
    config.python.min_version = "three".to_string();
    assert!(validator::validate_config(&config).is_err());

    let mut config = BuildConfig::default();
    config.product.app_name = String::new();
    assert!(validator::validate_config(&config).is_err());
}

// ============================================================================
// ConfigManager resolution
// ============================================================================

#[test]
fn test_resolve_without_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let manager = ConfigManager::resolve(temp_dir.path(), None).unwrap();

    assert!(manager.source().is_none());
    assert_eq!(manager.config().project_root, temp_dir.path());
    assert_eq!(manager.config().build.dist_dir, "dist.win32");
}

#[test]
fn test_resolve_prefers_project_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "[build]\ndist_dir = \"out\"\n").unwrap();

    let manager = ConfigManager::resolve(temp_dir.path(), None).unwrap();
    assert_eq!(manager.source(), Some(path.as_path()));
    assert_eq!(manager.config().build.dist_dir, "out");
}

#[test]
fn test_resolve_explicit_file_must_exist() {
    let temp_dir = tempdir().unwrap();
    let explicit = temp_dir.path().join("missing.toml");
    let result = ConfigManager::resolve(temp_dir.path(), Some(&explicit));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn test_resolve_validates_loaded_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[freeze]\noptimize = 7\n").unwrap();

    let result = ConfigManager::resolve(temp_dir.path(), Some(&path));
    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
}

#[test]
fn test_sdk_dir_env_override() {
    let config = BuildConfig::default();
    let overridden = config.sdk_dir_with(|key| {
        assert_eq!(key, "WINDOWS_SDK_BIN");
        Some(r"E:\kits\bin".to_string())
    });
    assert_eq!(overridden, PathBuf::from(r"E:\kits\bin"));

    let fallback = config.sdk_dir_with(|_| Some("  ".to_string()));
    assert_eq!(fallback, config.installer.sdk_path);
}

//! Config file loader and serialization.

use crate::config::BuildConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Load config from TOML file.
pub fn load_config_from_file(path: &Path) -> Result<BuildConfig, ConfigError> {
    validate_config_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let config: BuildConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to TOML file.
pub fn save_config_to_file(config: &BuildConfig, path: &Path) -> Result<(), ConfigError> {
    validate_config_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(ConfigError::IoError)?;

    Ok(())
}

/// Create default config.
pub fn create_default_config() -> BuildConfig {
    BuildConfig::default()
}

/// Validate config path (.toml extension required).
pub fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    match path.extension() {
        Some(ext) if ext == "toml" => {}
        Some(ext) => {
            return Err(ConfigError::ValidationFailed(format!(
                "Configuration file must have .toml extension, got .{}",
                ext.to_string_lossy()
            )))
        }
        None => {
            return Err(ConfigError::ValidationFailed(
                "Configuration file must have .toml extension".to_string(),
            ))
        }
    }

    if path.to_str().is_none() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path contains invalid characters".to_string(),
        ));
    }

    Ok(())
}

//! Config validation.

use crate::config::BuildConfig;
use crate::error::ConfigError;

/// Validate an application version of the form X.Y.Z with optional
/// `-prerelease` / `+build` suffixes.
pub fn validate_app_version(version: &str) -> Result<(), ConfigError> {
    if version.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "product.version cannot be empty".to_string(),
        ));
    }

    let core = truncate_version(version);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() != 3 {
        return Err(ConfigError::ValidationFailed(format!(
            "product.version must follow semantic versioning (X.Y.Z), got: {}",
            version
        )));
    }

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || part.parse::<u32>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "product.version part {} must be a non-negative number, got: '{}'",
                i, part
            )));
        }
    }

    Ok(())
}

/// Strip pre-release and build metadata: "5.12.1-beta0+abc" -> "5.12.1".
pub fn truncate_version(version: &str) -> &str {
    let end = version.find(|c| c == '-' || c == '+').unwrap_or(version.len());
    &version[..end]
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

/// Validate the whole config.
pub fn validate_config(config: &BuildConfig) -> Result<(), ConfigError> {
    require_non_empty("product.app_name", &config.product.app_name)?;
    require_non_empty("product.app_cmd_name", &config.product.app_cmd_name)?;
    require_non_empty("product.windowed_script", &config.product.windowed_script)?;
    require_non_empty("product.console_script", &config.product.console_script)?;
    require_non_empty("build.platform", &config.build.platform)?;
    require_non_empty("build.version_file", &config.build.version_file)?;
    require_non_empty("python.interpreter", &config.python.interpreter)?;
    require_non_empty("data_files.l10n_extension", &config.data_files.l10n_extension)?;

    validate_app_version(&config.product.version)?;
    config.min_python_version()?;

    if config.freeze.optimize > 2 {
        return Err(ConfigError::ValidationFailed(format!(
            "freeze.optimize must be 0, 1 or 2, got: {}",
            config.freeze.optimize
        )));
    }

    if config.installer.default_locale == 0 {
        return Err(ConfigError::ValidationFailed(
            "installer.default_locale must be a non-zero LCID".to_string(),
        ));
    }

    // stamp is written directly into the project root
    if config.build.version_file.contains(['/', '\\']) {
        return Err(ConfigError::ValidationFailed(format!(
            "build.version_file must be a bare file name, got: {}",
            config.build.version_file
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BuildConfig::default()).is_ok());
    }

    #[test]
    fn test_truncate_version() {
        assert_eq!(truncate_version("5.12.1"), "5.12.1");
        assert_eq!(truncate_version("5.12.1-beta0"), "5.12.1");
        assert_eq!(truncate_version("5.12.1+abc1234"), "5.12.1");
        assert_eq!(truncate_version("5.12.1-rc1+abc1234"), "5.12.1");
    }

    #[test]
    fn test_validate_app_version() {
        assert!(validate_app_version("5.12.1").is_ok());
        assert!(validate_app_version("5.12.1-beta0").is_ok());
        assert!(validate_app_version("").is_err());
        assert!(validate_app_version("5.12").is_err());
        assert!(validate_app_version("5.x.1").is_err());
    }

    #[test]
    fn test_optimize_out_of_range() {
        let mut config = BuildConfig::default();
        config.freeze.optimize = 3;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_min_python_version() {
        let mut config = BuildConfig::default();
        config.python.min_version = "three".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_app_name() {
        let mut config = BuildConfig::default();
        config.product.app_name = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_version_file_must_be_bare_name() {
        let mut config = BuildConfig::default();
        config.build.version_file = "../.gitversion".to_string();
        assert!(validate_config(&config).is_err());
    }
}

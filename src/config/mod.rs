//! Configuration module for freeze and installer packaging.
//!
//! A single `BuildConfig` record is resolved once at startup and passed by
//! reference into every phase. Nothing in the build reads ambient globals.
//!
//! # Module Structure
//!
//! - `loader`: Reads and writes `BuildConfig` as TOML
//! - `validator`: Range and consistency checks on a loaded config
//!
//! # Configuration Flow
//!
//! 1. `ConfigManager::resolve` picks an explicit file, the project default
//!    file (`freezepack.toml`) or the built-in defaults
//! 2. The project root is attached to the config
//! 3. Validator ensures all settings are usable
//! 4. The config is handed to the orchestrator

pub mod loader;
pub mod validator;

use crate::error::ConfigError;
use crate::models::{InterpreterVersion, LocaleId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project config file looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "freezepack.toml";

/// Product identity and version resource fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    pub app_name: String,
    pub app_cmd_name: String,
    /// Application version, semantic (e.g. "5.12.1" or "5.12.1-beta0")
    pub version: String,
    pub description: String,
    pub company_name: String,
    pub copyright: String,
    pub language: String,
    pub windowed_script: String,
    pub console_script: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        ProductConfig {
            app_name: "EDMarketConnector".to_string(),
            app_cmd_name: "EDMC".to_string(),
            version: "5.12.1".to_string(),
            description: "Downloads commodity market and other station data from the game \
                          Elite Dangerous for use with all popular online and offline trading tools."
                .to_string(),
            company_name: "EDCD".to_string(),
            copyright: "Copyright (c) EDCD".to_string(),
            language: "English (United States)".to_string(),
            windowed_script: "EDMarketConnector.py".to_string(),
            console_script: "EDMC.py".to_string(),
        }
    }
}

/// Host expectations and output locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Freeze output directory, relative to the project root
    pub dist_dir: String,
    /// Expected `std::env::consts::OS` of the build host
    pub platform: String,
    /// Version stamp file name, written in the project root
    pub version_file: String,
    /// Where the generated freeze spec is written (system temp dir if unset)
    pub work_dir: Option<PathBuf>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            dist_dir: "dist.win32".to_string(),
            platform: "windows".to_string(),
            version_file: ".gitversion".to_string(),
            work_dir: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    pub interpreter: String,
    pub min_version: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        PythonConfig {
            interpreter: "python".to_string(),
            min_version: "3.11".to_string(),
        }
    }
}

/// Non-code assets bundled next to the executables.
///
/// Entries of `top_level` may use `{app}` and `{cmd}` placeholders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFilesConfig {
    pub top_level: Vec<String>,
    pub l10n_dir: String,
    pub l10n_extension: String,
    pub fdevids_dir: String,
    pub fdevids_files: Vec<String>,
}

impl Default for DataFilesConfig {
    fn default() -> Self {
        DataFilesConfig {
            top_level: [
                "WinSparkle.dll",
                "WinSparkle.pdb",
                "EUROCAPS.TTF",
                "ChangeLog.md",
                "snd_good.wav",
                "snd_bad.wav",
                "modules.p",
                "ships.p",
                "{app}.VisualElementsManifest.xml",
                "{app}.ico",
                "{app} - TRACE.bat",
                "{app} - localserver-auth.bat",
                "{app} - reset-ui.bat",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            l10n_dir: "L10n".to_string(),
            l10n_extension: ".strings".to_string(),
            fdevids_dir: "FDevIDs".to_string(),
            fdevids_files: vec!["commodity.csv".to_string(), "rare_commodity.csv".to_string()],
        }
    }
}

/// py2exe options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeConfig {
    pub optimize: u8,
    pub packages: Vec<String>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FreezeConfig {
    fn default() -> Self {
        FreezeConfig {
            optimize: 2,
            packages: strings(&[
                "asyncio",
                "multiprocessing",
                "pkg_resources._vendor.platformdirs",
                "sqlite3",
                "util",
            ]),
            includes: strings(&["dataclasses", "shutil", "timeout_session", "zipfile"]),
            excludes: strings(&[
                "distutils",
                "_markerlib",
                "optparse",
                "PIL",
                "simplejson",
                "unittest",
                "doctest",
                "pdb",
                "difflib",
            ]),
        }
    }
}

/// Installer language post-processing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub default_locale: LocaleId,
    /// Directory holding WiLangId.vbs, MsiTran.Exe and WiSubStg.vbs
    pub sdk_path: PathBuf,
    /// Environment variable that overrides `sdk_path` when set
    pub sdk_path_env: String,
    /// Scratch directory for per-locale copies (system temp dir if unset)
    pub work_dir: Option<PathBuf>,
    /// Descriptor file; defaults to `{app}.wxs`
    pub descriptor: Option<String>,
    pub script_host: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        InstallerConfig {
            default_locale: 1033,
            sdk_path: PathBuf::from(r"C:\Program Files (x86)\Windows Kits\10\bin\10.0.19041.0\x86"),
            sdk_path_env: "WINDOWS_SDK_BIN".to_string(),
            work_dir: None,
            descriptor: None,
            script_host: "cscript".to_string(),
        }
    }
}

/// Complete build configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Project checkout every relative path is resolved against
    #[serde(skip)]
    pub project_root: PathBuf,

    /// Plugin scripts bundled into `plugins/`
    pub plugins: Vec<String>,

    pub product: ProductConfig,
    pub build: BuildSettings,
    pub python: PythonConfig,
    pub data_files: DataFilesConfig,
    pub freeze: FreezeConfig,
    pub installer: InstallerConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            project_root: PathBuf::from("."),
            plugins: strings(&[
                "plugins/coriolis.py",
                "plugins/eddn.py",
                "plugins/edsm.py",
                "plugins/edsy.py",
                "plugins/inara.py",
            ]),
            product: ProductConfig::default(),
            build: BuildSettings::default(),
            python: PythonConfig::default(),
            data_files: DataFilesConfig::default(),
            freeze: FreezeConfig::default(),
            installer: InstallerConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Replace `{app}` and `{cmd}` placeholders.
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{app}", &self.product.app_name)
            .replace("{cmd}", &self.product.app_cmd_name)
    }

    /// Resolve a project-relative path.
    pub fn project_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.project_root.join(relative)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.project_path(&self.build.dist_dir)
    }

    pub fn min_python_version(&self) -> Result<InterpreterVersion, ConfigError> {
        InterpreterVersion::parse(&self.python.min_version).ok_or_else(|| {
            ConfigError::ValidationFailed(format!(
                "python.min_version must look like X.Y or X.Y.Z, got: {}",
                self.python.min_version
            ))
        })
    }

    pub fn descriptor_path(&self) -> PathBuf {
        let name = match &self.installer.descriptor {
            Some(name) => self.expand(name),
            None => format!("{}.wxs", self.product.app_name),
        };
        self.project_path(name)
    }

    /// SDK tool directory, honouring the override environment variable.
    pub fn sdk_dir(&self) -> PathBuf {
        self.sdk_dir_with(|key| std::env::var(key).ok())
    }

    pub fn sdk_dir_with<F>(&self, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&self.installer.sdk_path_env) {
            Some(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => self.installer.sdk_path.clone(),
        }
    }

    pub fn installer_work_dir(&self) -> PathBuf {
        self.installer
            .work_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    pub fn build_work_dir(&self) -> PathBuf {
        self.build.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Primary configuration manager.
///
/// Owns the resolved `BuildConfig` and remembers where it came from.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    source: Option<PathBuf>,
    config: BuildConfig,
}

impl ConfigManager {
    /// Resolve the config for a project.
    ///
    /// An explicit path must exist. Without one, `freezepack.toml` in the
    /// project root is used when present, otherwise the built-in defaults.
    pub fn resolve(project_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = project_root.join(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Some(default_path)
                } else {
                    None
                }
            }
        };

        let (mut config, source) = match candidate {
            Some(path) => {
                log::debug!("[Config] Loading {}", path.display());
                (loader::load_config_from_file(&path)?, Some(path))
            }
            None => {
                log::debug!("[Config] No config file found, using built-in defaults");
                (BuildConfig::default(), None)
            }
        };
        config.project_root = project_root.to_path_buf();

        validator::validate_config(&config)?;
        Ok(ConfigManager { source, config })
    }

    /// File the config was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn into_config(self) -> BuildConfig {
        self.config
    }
}

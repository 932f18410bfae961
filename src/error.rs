//! Unified error type hierarchy for freezepack
//!
//! Provides structured error handling with PreflightError, ConfigError, BuildError,
//! InstallerError and AppError.

use std::io;
use thiserror::Error;

/// Host validation errors raised before any build output is produced.
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Interpreter unavailable: {0}")]
    InterpreterUnavailable(String),

    #[error("Unexpected Python version {found}, {required} or newer is required")]
    InterpreterTooOld { found: String, required: String },

    #[error("Unsupported platform {found}, expected {expected}")]
    UnsupportedPlatform { found: String, expected: String },

    #[error("Invalid Git Hash: {0}")]
    InvalidGitHash(String),

    #[error("IO error during preflight: {0}")]
    Io(#[from] io::Error),
}

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Freeze pipeline errors.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Required resource missing: {0}")]
    ResourceMissing(String),

    #[error("Data file assembly failed: {0}")]
    AssemblyFailed(String),

    #[error("Failed to launch freeze tool: {0}")]
    LaunchFailed(String),

    #[error("Freeze tool failed: {}", describe_exit(.code))]
    FreezeFailed { code: Option<i32> },

    #[error("Invalid phase transition: {0}")]
    InvalidTransition(String),

    #[error("Failed to serialize freeze spec: {0}")]
    SpecSerialization(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Installer language post-processing errors.
#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Installer descriptor not found: {0}")]
    DescriptorNotFound(String),

    #[error("Installer descriptor is not valid XML: {0}")]
    DescriptorInvalid(String),

    #[error("No Languages attribute declared in {0}")]
    LanguagesMissing(String),

    #[error("Invalid locale id '{0}'")]
    InvalidLocale(String),

    #[error("Locale {0} is declared more than once")]
    DuplicateLocale(u32),

    #[error("Refusing to copy {0} onto itself")]
    SamePackage(String),

    #[error("Default language is {found}, should be {expected}")]
    DefaultLocaleMismatch { found: u32, expected: u32 },

    #[error("Step '{step}' failed for locale {locale}: {reason}")]
    ToolFailed {
        step: String,
        locale: u32,
        reason: String,
    },

    #[error("IO error during installer processing: {0}")]
    Io(#[from] io::Error),
}

/// Global error type for OS-level operations
///
/// Provides unified error categorization and user-facing messages.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// OS command failed to launch or could not be awaited
    #[error("Command '{cmd}' failed: {reason}")]
    OsCommand { cmd: String, reason: String },

    /// Invalid input (e.g. empty program name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Get a user-facing error message suitable for console display
    pub fn user_message(&self) -> String {
        match self {
            AppError::OsCommand { cmd, reason } => {
                format!("Failed to execute '{}': {}", cmd, reason)
            }
            AppError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        }
    }
}

/// Top-level result type for operations that may fail.
/// Use this as the return type for the top-level build flows.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

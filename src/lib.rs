//! freezepack
//!
//! Build orchestration for a Python Windows desktop application: validates the
//! build host, stamps the source-control version, assembles the bundled data
//! files, drives the py2exe freeze tool and post-processes the multi-language
//! installer package with the Windows SDK utilities.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures handed to the external tools
//! - **config**: `BuildConfig` resolution, TOML loading and validation
//! - **vcs**: Source-control short hash via git2
//! - **system**: Host facts and external tool execution
//! - **log_collector**: File-backed logger behind the `log` facade
//! - **orchestrator**: Phase sequencing and state tracking
//! - **cli**: Command line surface

// Core foundational modules
pub mod error;
pub mod models;

// Host and tool abstraction (interpreter probe, SDK tool runner)
pub mod system;

pub mod config;
pub mod vcs;

// Robust, decoupled logging system
pub mod log_collector;

// Freeze pipeline and installer post-processing
pub mod orchestrator;

pub mod cli;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{AppError, BuildError, ConfigError, InstallerError, PreflightError, Result};

pub use models::{
    DataFileGroup, DataFileManifest, EmbeddedResource, ExecutableTarget, FreezeOptions,
    FreezeSpec, HostInfo, InterpreterVersion, LanguageReport, LocaleId, PreflightReport,
    VersionInfo,
};

pub use config::{BuildConfig, ConfigManager};

pub use orchestrator::{BuildOrchestrator, BuildPhaseState, OrchestrationState};

pub use system::{ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

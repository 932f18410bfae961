//! Orchestrator phases: the freeze pipeline stages plus installer post-processing.
//!
//! - **Preflight** (`preflight`) - host validation, output directory cleanup
//! - **Version stamp** (`stamp`) - short hash sidecar file
//! - **Data files** (`data_files`) - assets bundled next to the executables
//! - **Freeze** (`freeze`) - py2exe invocation
//! - **Installer** (`installer`) - per-language transforms for the MSI
//!
//! Each phase is independently testable and composed by `BuildOrchestrator`.

pub mod data_files;
pub mod freeze;
pub mod installer;
pub mod preflight;
pub mod stamp;

pub use data_files::{generate_data_files, localization_files};
pub use freeze::{build_freeze_spec, run_freeze, write_freeze_spec};
pub use installer::{parse_languages, read_locales, split_installer_languages};
pub use preflight::{check_host, check_interpreter_version, check_platform, probe_host, run_preflight};
pub use stamp::write_version_stamp;

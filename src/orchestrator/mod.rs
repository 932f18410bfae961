//! Build Orchestration: linear freeze pipeline (Preflight -> VersionStamp -> DataFiles -> Freeze)
//! plus the separately invoked installer language post-processing.

pub mod executor;
pub mod phases;
pub mod state;

use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use executor::{run_streaming, StreamKind};
pub use state::{BuildPhaseState, OrchestrationState};

use crate::config::BuildConfig;
use crate::error::{BuildError, InstallerError, Result};
use crate::log_parsed;
use crate::models::{FreezeSpec, LanguageReport, LocaleId};
use crate::system::ToolRunner;

/// Sequences the freeze phases against one resolved `BuildConfig`.
pub struct BuildOrchestrator {
    /// Configuration shared read-only by every phase
    config: BuildConfig,

    /// Executes short-lived external tools (interpreter probe, SDK utilities)
    runner: Box<dyn ToolRunner>,

    /// Phase tracking, readable while a build is in progress
    state: Arc<RwLock<OrchestrationState>>,
}

impl BuildOrchestrator {
    /// Create an orchestrator in the Preflight phase.
    ///
    /// # Examples
    /// ```ignore
    /// let orch = BuildOrchestrator::new(config, Box::new(ProcessRunner::new()));
    /// orch.run_freeze().await?;
    /// ```
    pub fn new(config: BuildConfig, runner: Box<dyn ToolRunner>) -> Self {
        BuildOrchestrator {
            config,
            runner,
            state: Arc::new(RwLock::new(OrchestrationState::new())),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Get the current build phase.
    pub async fn current_phase(&self) -> BuildPhaseState {
        self.state.read().await.phase
    }

    /// Snapshot of the full orchestration state.
    pub async fn state_snapshot(&self) -> OrchestrationState {
        self.state.read().await.clone()
    }

    /// Transition to the next build phase, logging it as a milestone.
    pub async fn transition_phase(&self, next_phase: BuildPhaseState) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .transition_to(next_phase)
            .map_err(BuildError::InvalidTransition)?;
        log_parsed!("PHASE TRANSITION: {}", next_phase.as_str());
        Ok(())
    }

    /// Run the full freeze pipeline.
    ///
    /// On failure the error is recorded in the state and returned unchanged,
    /// so callers can still downcast it to pick an exit code.
    pub async fn run_freeze(&self) -> Result<()> {
        match self.freeze_phases().await {
            Ok(()) => {
                self.transition_phase(BuildPhaseState::Completed).await?;
                log_parsed!("BUILD COMPLETED: {}", self.config.dist_dir().display());
                Ok(())
            }
            Err(e) => {
                self.state.write().await.record_error(e.to_string());
                log_parsed!("BUILD FAILED: {}", e);
                Err(e)
            }
        }
    }

    async fn freeze_phases(&self) -> Result<()> {
        log_parsed!(
            "Freezing {} {}",
            self.config.product.app_name,
            self.config.product.version
        );

        // Phase 1: Preflight (also writes the stamp once every check passed)
        let host = phases::probe_host(&self.config, self.runner.as_ref())?;
        let report = phases::run_preflight(&self.config, &host)?;
        {
            let mut state = self.state.write().await;
            state.git_shorthash = Some(report.git_shorthash.clone());
            state.version_file = Some(report.version_file.clone());
        }
        self.transition_phase(BuildPhaseState::VersionStamp).await?;

        // Phase 3: Data files
        self.transition_phase(BuildPhaseState::DataFiles).await?;
        let data_files = phases::generate_data_files(&self.config, &report.version_file)?;
        self.state.write().await.data_file_count = data_files.file_count();

        // Phase 4: Freeze
        let spec = phases::build_freeze_spec(&self.config, &report.git_shorthash, data_files)?;
        self.transition_phase(BuildPhaseState::Freeze).await?;
        phases::run_freeze(&self.config, &spec).await?;

        Ok(())
    }

    /// Assemble the freeze spec without side effects.
    ///
    /// Skips host validation, deletes nothing and writes no stamp; the stamp
    /// path is listed where the freeze step would create it.
    pub fn plan(&self) -> Result<FreezeSpec> {
        let git_shorthash = phases::preflight::git_shorthash(&self.config.project_root)?;
        let version_file = self.config.project_path(&self.config.build.version_file);
        let data_files = phases::generate_data_files(&self.config, &version_file)?;
        Ok(phases::build_freeze_spec(&self.config, &git_shorthash, data_files)?)
    }

    /// Locale ids declared by the installer descriptor.
    pub fn locales(&self) -> std::result::Result<Vec<LocaleId>, InstallerError> {
        phases::read_locales(&self.config)
    }

    /// Embed per-language transforms into `msi_path`.
    pub fn installer_languages(
        &self,
        msi_path: &Path,
    ) -> std::result::Result<LanguageReport, InstallerError> {
        log_parsed!("Processing installer languages for {}", msi_path.display());
        let report = phases::split_installer_languages(&self.config, self.runner.as_ref(), msi_path)?;
        log_parsed!(
            "Embedded {} language transforms into {}",
            report.transforms.len(),
            msi_path.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, PreflightError};
    use crate::system::{ToolInvocation, ToolOutput};

    struct BannerRunner(&'static str);

    impl ToolRunner for BannerRunner {
        fn run(&self, _invocation: &ToolInvocation) -> std::result::Result<ToolOutput, AppError> {
            Ok(ToolOutput {
                code: Some(0),
                stdout: self.0.to_string(),
                stderr: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_old_interpreter_fails_in_preflight() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = BuildConfig::default();
        config.project_root = temp_dir.path().to_path_buf();

        let orch = BuildOrchestrator::new(config, Box::new(BannerRunner("Python 3.8.10")));
        let err = orch.run_freeze().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PreflightError>(),
            Some(PreflightError::InterpreterTooOld { .. })
        ));
        let state = orch.state_snapshot().await;
        assert_eq!(state.phase, BuildPhaseState::Failed);
        assert!(state.error.is_some());
        assert!(!temp_dir.path().join(".gitversion").exists());
    }

    #[tokio::test]
    async fn test_new_orchestrator_starts_in_preflight() {
        let orch = BuildOrchestrator::new(
            BuildConfig::default(),
            Box::new(BannerRunner("Python 3.12.1")),
        );
        assert_eq!(orch.current_phase().await, BuildPhaseState::Preflight);
    }

    #[test]
    fn test_locales_without_descriptor() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = BuildConfig::default();
        config.project_root = temp_dir.path().to_path_buf();

        let orch = BuildOrchestrator::new(config, Box::new(BannerRunner("")));
        assert!(matches!(
            orch.locales(),
            Err(InstallerError::DescriptorNotFound(_))
        ));
    }
}

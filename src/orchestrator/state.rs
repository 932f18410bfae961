//! Build State Management and Phase Tracking
//!
//! `BuildPhaseState` names the discrete freeze pipeline phases and which
//! transitions between them are legal. `OrchestrationState` is the running
//! record the orchestrator updates as phases complete.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Build phase enumeration - discrete states in the freeze lifecycle.
///
/// The orchestrator moves through these strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildPhaseState {
    /// Phase 1: interpreter, platform and source-control checks
    Preflight,

    /// Phase 2: short hash written to the sidecar file
    VersionStamp,

    /// Phase 3: data file manifest assembly
    DataFiles,

    /// Phase 4: py2exe invocation
    Freeze,

    /// Build completed successfully
    Completed,

    /// Build failed; the error is recorded in the state
    Failed,
}

impl BuildPhaseState {
    /// Get the human-readable name for this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhaseState::Preflight => "preflight",
            BuildPhaseState::VersionStamp => "version-stamp",
            BuildPhaseState::DataFiles => "data-files",
            BuildPhaseState::Freeze => "freeze",
            BuildPhaseState::Completed => "completed",
            BuildPhaseState::Failed => "failed",
        }
    }

    /// Get all valid phase transitions FROM this phase.
    pub fn valid_next_phases(&self) -> Vec<BuildPhaseState> {
        match self {
            BuildPhaseState::Preflight => vec![BuildPhaseState::VersionStamp, BuildPhaseState::Failed],
            BuildPhaseState::VersionStamp => vec![BuildPhaseState::DataFiles, BuildPhaseState::Failed],
            BuildPhaseState::DataFiles => vec![BuildPhaseState::Freeze, BuildPhaseState::Failed],
            BuildPhaseState::Freeze => vec![BuildPhaseState::Completed, BuildPhaseState::Failed],
            BuildPhaseState::Completed => vec![],
            BuildPhaseState::Failed => vec![],
        }
    }

    /// Check if a transition to the given phase is valid.
    pub fn can_transition_to(&self, next: BuildPhaseState) -> bool {
        self.valid_next_phases().contains(&next)
    }
}

/// Build execution state snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationState {
    /// Current build phase
    pub phase: BuildPhaseState,

    /// Short hash determined by preflight
    pub git_shorthash: Option<String>,

    /// Stamp file written by preflight
    pub version_file: Option<PathBuf>,

    /// Number of data files handed to the freeze tool
    pub data_file_count: usize,

    /// Build start timestamp
    pub start_time: SystemTime,

    /// Last phase update timestamp
    pub last_update_time: SystemTime,

    /// Error message if phase failed
    pub error: Option<String>,
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationState {
    pub fn new() -> Self {
        let now = SystemTime::now();
        OrchestrationState {
            phase: BuildPhaseState::Preflight,
            git_shorthash: None,
            version_file: None,
            data_file_count: 0,
            start_time: now,
            last_update_time: now,
            error: None,
        }
    }

    /// Attempt to transition to the next phase.
    pub fn transition_to(&mut self, next_phase: BuildPhaseState) -> Result<(), String> {
        if !self.phase.can_transition_to(next_phase) {
            return Err(format!(
                "Invalid phase transition: {} -> {}",
                self.phase.as_str(),
                next_phase.as_str()
            ));
        }
        self.phase = next_phase;
        self.last_update_time = SystemTime::now();
        Ok(())
    }

    /// Record an error and mark phase as failed.
    pub fn record_error(&mut self, error: String) {
        self.error = Some(error);
        self.phase = BuildPhaseState::Failed;
        self.last_update_time = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        assert!(BuildPhaseState::Preflight.can_transition_to(BuildPhaseState::VersionStamp));
        assert!(!BuildPhaseState::Preflight.can_transition_to(BuildPhaseState::Freeze));
        assert!(BuildPhaseState::Freeze.can_transition_to(BuildPhaseState::Completed));
        assert!(BuildPhaseState::Completed.valid_next_phases().is_empty());
    }

    #[test]
    fn test_linear_walk_to_completion() {
        let mut state = OrchestrationState::new();
        for next in [
            BuildPhaseState::VersionStamp,
            BuildPhaseState::DataFiles,
            BuildPhaseState::Freeze,
            BuildPhaseState::Completed,
        ] {
            assert!(state.transition_to(next).is_ok());
        }
        assert_eq!(state.phase, BuildPhaseState::Completed);
    }

    #[test]
    fn test_invalid_phase_transition() {
        let mut state = OrchestrationState::new();
        let err = state.transition_to(BuildPhaseState::Completed).unwrap_err();
        assert_eq!(err, "Invalid phase transition: preflight -> completed");
        assert_eq!(state.phase, BuildPhaseState::Preflight);
    }

    #[test]
    fn test_record_error() {
        let mut state = OrchestrationState::new();
        state.transition_to(BuildPhaseState::VersionStamp).unwrap();
        state.record_error("disk full".to_string());
        assert_eq!(state.phase, BuildPhaseState::Failed);
        assert_eq!(state.error.as_deref(), Some("disk full"));
    }
}

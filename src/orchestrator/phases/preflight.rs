//! Phase 1: Preflight - host validation and clean output directory.
//!
//! Checks run before anything touches the filesystem:
//! - the interpreter meets the minimum version
//! - the host platform is the expected one
//! - a short hash can be derived from HEAD
//!
//! Only when all three pass is the old output directory removed and the
//! version stamp written.

use crate::config::BuildConfig;
use crate::error::PreflightError;
use crate::models::{HostInfo, InterpreterVersion, PreflightReport};
use crate::orchestrator::phases::stamp::write_version_stamp;
use crate::system::{self, ToolRunner};
use crate::vcs::GitManager;
use std::path::{Component, Path};

/// Reject interpreters older than `required`.
pub fn check_interpreter_version(
    found: InterpreterVersion,
    required: InterpreterVersion,
) -> Result<(), PreflightError> {
    if found < required {
        return Err(PreflightError::InterpreterTooOld {
            found: found.to_string(),
            required: required.to_string(),
        });
    }
    Ok(())
}

/// Reject any host OS other than `expected`.
pub fn check_platform(found: &str, expected: &str) -> Result<(), PreflightError> {
    if !found.eq_ignore_ascii_case(expected) {
        return Err(PreflightError::UnsupportedPlatform {
            found: found.to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

/// Validate a probed host against the config. No side effects.
pub fn check_host(host: &HostInfo, config: &BuildConfig) -> Result<(), PreflightError> {
    let required = config
        .min_python_version()
        .map_err(|e| PreflightError::InterpreterUnavailable(e.to_string()))?;

    check_interpreter_version(host.interpreter, required)?;
    check_platform(&host.os, &config.build.platform)?;
    Ok(())
}

/// Gather the facts `check_host` needs from the running machine.
pub fn probe_host(config: &BuildConfig, runner: &dyn ToolRunner) -> Result<HostInfo, PreflightError> {
    let interpreter = system::query_interpreter_version(runner, &config.python.interpreter)?;
    Ok(HostInfo {
        os: system::host_os().to_string(),
        interpreter,
    })
}

/// Short hash of the project's HEAD, `.DIRTY` suffixed for modified trees.
pub fn git_shorthash(project_root: &Path) -> Result<String, PreflightError> {
    GitManager::open(project_root)
        .and_then(|git| git.shorthash_from_head())
        .map_err(|e| PreflightError::InvalidGitHash(e.to_string()))
}

/// Whether `dist_dir` is specific enough to delete.
///
/// Empty and single-character paths are refused, as is anything that names
/// no real directory component (`./`, `/`, `C:\`). Any `..` component is
/// refused outright since `dist/..` resolves to the project root itself.
pub fn is_safe_to_remove(dist_dir: &str) -> bool {
    if dist_dir.chars().count() <= 1 {
        return false;
    }
    let components: Vec<Component> = Path::new(dist_dir).components().collect();
    if components.iter().any(|c| matches!(c, Component::ParentDir)) {
        return false;
    }
    components.iter().any(|c| matches!(c, Component::Normal(_)))
}

/// Remove the previous freeze output. Returns whether anything was deleted.
pub fn clean_dist_dir(config: &BuildConfig) -> Result<bool, PreflightError> {
    let dist_dir = &config.build.dist_dir;
    if !is_safe_to_remove(dist_dir) {
        log::warn!(
            "[Preflight] Refusing to remove output directory '{}'",
            dist_dir
        );
        return Ok(false);
    }

    let path = config.dist_dir();
    if !path.is_dir() {
        return Ok(false);
    }

    log::info!("[Preflight] Removing previous output: {}", path.display());
    std::fs::remove_dir_all(&path)?;
    Ok(true)
}

/// Run the whole preflight for an already probed host.
///
/// # Returns
/// * `Ok(PreflightReport)` with the hash and the stamp file location
/// * `Err(PreflightError)` if any check fails; nothing is deleted or written
pub fn run_preflight(config: &BuildConfig, host: &HostInfo) -> Result<PreflightReport, PreflightError> {
    check_host(host, config)?;

    let git_shorthash = git_shorthash(&config.project_root)?;
    log::info!(
        "[Preflight] Host OK: {} with Python {}",
        host.os,
        host.interpreter
    );

    let removed_dist_dir = clean_dist_dir(config)?;

    let version_file =
        write_version_stamp(&config.project_root, &config.build.version_file, &git_shorthash)?;
    log::info!("Git short hash: {}", git_shorthash);

    Ok(PreflightReport {
        git_shorthash,
        version_file,
        removed_dist_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn windows_host(major: u32, minor: u32) -> HostInfo {
        HostInfo {
            os: "windows".to_string(),
            interpreter: InterpreterVersion::new(major, minor, 0),
        }
    }

    #[test]
    fn test_check_host_accepts_supported() {
        let config = BuildConfig::default();
        assert!(check_host(&windows_host(3, 11), &config).is_ok());
        assert!(check_host(&windows_host(3, 13), &config).is_ok());
    }

    #[test]
    fn test_check_host_rejects_old_python() {
        let config = BuildConfig::default();
        let result = check_host(&windows_host(3, 10), &config);
        assert!(matches!(result, Err(PreflightError::InterpreterTooOld { .. })));
    }

    #[test]
    fn test_check_host_rejects_linux() {
        let config = BuildConfig::default();
        let mut host = windows_host(3, 12);
        host.os = "linux".to_string();
        let result = check_host(&host, &config);
        assert!(matches!(result, Err(PreflightError::UnsupportedPlatform { .. })));
    }

    #[test]
    fn test_is_safe_to_remove() {
        assert!(!is_safe_to_remove(""));
        assert!(!is_safe_to_remove("."));
        assert!(!is_safe_to_remove("/"));
        assert!(!is_safe_to_remove("./"));
        assert!(!is_safe_to_remove(".."));
        assert!(is_safe_to_remove("dist.win32"));
        assert!(is_safe_to_remove("build/dist"));
    }

    #[test]
    fn test_is_safe_to_remove_rejects_parent_components() {
        assert!(!is_safe_to_remove("dist/.."));
        assert!(!is_safe_to_remove("../x/.."));
        assert!(!is_safe_to_remove("build/../dist"));
        assert!(!is_safe_to_remove("../sibling"));
    }

    #[test]
    fn test_clean_dist_dir_removes_tree() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = BuildConfig::default();
        config.project_root = temp_dir.path().to_path_buf();

        let dist = temp_dir.path().join("dist.win32");
        std::fs::create_dir_all(dist.join("lib")).unwrap();
        std::fs::write(dist.join("lib/old.pyd"), b"x").unwrap();

        assert!(clean_dist_dir(&config).unwrap());
        assert!(!dist.exists());
        // second run has nothing to delete
        assert!(!clean_dist_dir(&config).unwrap());
    }

    #[test]
    fn test_clean_dist_dir_never_deletes_degenerate_paths() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("keep.txt"), b"x").unwrap();

        for degenerate in ["", ".", "dist/..", "src/../"] {
            let mut config = BuildConfig::default();
            config.project_root = temp_dir.path().to_path_buf();
            config.build.dist_dir = degenerate.to_string();

            assert!(!clean_dist_dir(&config).unwrap());
            assert!(temp_dir.path().join("keep.txt").exists());
        }
    }

    #[test]
    fn test_run_preflight_rejects_before_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = BuildConfig::default();
        config.project_root = temp_dir.path().to_path_buf();
        std::fs::create_dir_all(temp_dir.path().join("dist.win32")).unwrap();

        let result = run_preflight(&config, &windows_host(3, 9));
        assert!(result.is_err());
        assert!(temp_dir.path().join("dist.win32").exists());
        assert!(!temp_dir.path().join(".gitversion").exists());
    }
}

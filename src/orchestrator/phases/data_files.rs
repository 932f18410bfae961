//! Phase 3: Data files - assets bundled next to the frozen executables.

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::models::{DataFileGroup, DataFileManifest};
use std::io;
use std::path::{Path, PathBuf};

/// List localization string tables in `l10n_dir` (project-relative).
///
/// A missing directory yields an empty list. Results are sorted by file name.
pub fn localization_files(
    project_root: &Path,
    l10n_dir: &str,
    extension: &str,
) -> Result<Vec<PathBuf>, BuildError> {
    let entries = match std::fs::read_dir(project_root.join(l10n_dir)) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("[DataFiles] Localization directory '{}' not found", l10n_dir);
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(BuildError::AssemblyFailed(format!(
                "Cannot list {}: {}",
                l10n_dir, e
            )))
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            BuildError::AssemblyFailed(format!("Cannot read entry in {}: {}", l10n_dir, e))
        })?;
        if entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(extension) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| Path::new(l10n_dir).join(name))
        .collect())
}

/// Build the ordered data file manifest.
///
/// # Arguments
/// * `config` - Build configuration (product name, asset lists, plugins)
/// * `version_file` - The stamp file written by preflight
pub fn generate_data_files(
    config: &BuildConfig,
    version_file: &Path,
) -> Result<DataFileManifest, BuildError> {
    let data = &config.data_files;

    // The freeze tool runs in the project root; keep paths relative to it.
    let stamp = version_file
        .strip_prefix(&config.project_root)
        .unwrap_or(version_file)
        .to_path_buf();

    let mut top_level = vec![stamp];
    top_level.extend(data.top_level.iter().map(|f| PathBuf::from(config.expand(f))));

    let l10n = localization_files(&config.project_root, &data.l10n_dir, &data.l10n_extension)?;

    let fdevids = data
        .fdevids_files
        .iter()
        .map(|f| Path::new(&data.fdevids_dir).join(f))
        .collect();

    let plugins = config.plugins.iter().map(PathBuf::from).collect();

    let manifest = DataFileManifest {
        groups: vec![
            DataFileGroup::new("", top_level),
            DataFileGroup::new(data.l10n_dir.clone(), l10n),
            DataFileGroup::new(data.fdevids_dir.clone(), fdevids),
            DataFileGroup::new("plugins", plugins),
        ],
    };

    log::info!(
        "[DataFiles] {} files in {} groups",
        manifest.file_count(),
        manifest.groups.len()
    );
    Ok(manifest)
}

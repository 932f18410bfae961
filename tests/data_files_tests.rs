use freezepack::config::BuildConfig;
use freezepack::orchestrator::phases::data_files::{generate_data_files, localization_files};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_only_strings_files_are_collected() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let l10n = temp_dir.path().join("L10n");
    fs::create_dir_all(&l10n).unwrap();
    fs::write(l10n.join("fr.strings"), "\"Cancel\" = \"Annuler\";").unwrap();
    fs::write(l10n.join("de.strings"), "\"Cancel\" = \"Abbrechen\";").unwrap();
    fs::write(l10n.join("readme.txt"), "not a table").unwrap();

    let files = localization_files(temp_dir.path(), "L10n", ".strings").unwrap();

    assert_eq!(
        files,
        vec![
            PathBuf::from("L10n").join("de.strings"),
            PathBuf::from("L10n").join("fr.strings"),
        ]
    );
}

#[test]
fn test_empty_l10n_dir_is_not_an_error() {
    let temp_dir = tempdir().unwrap();
    fs::create_dir_all(temp_dir.path().join("L10n")).unwrap();

    let files = localization_files(temp_dir.path(), "L10n", ".strings").unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_manifest_lists_localizations_and_custom_plugins() {
    let temp_dir = tempdir().unwrap();
    let l10n = temp_dir.path().join("L10n");
    fs::create_dir_all(&l10n).unwrap();
    fs::write(l10n.join("ja.strings"), "").unwrap();

    let mut config = BuildConfig::default();
    config.project_root = temp_dir.path().to_path_buf();
    config.plugins = vec!["plugins/eddn.py".to_string()];

    let stamp = temp_dir.path().join(".gitversion");
    let manifest = generate_data_files(&config, &stamp).unwrap();

    assert_eq!(
        manifest.group("L10n").unwrap().sources,
        vec![PathBuf::from("L10n").join("ja.strings")]
    );
    assert_eq!(
        manifest.group("plugins").unwrap().sources,
        vec![PathBuf::from("plugins/eddn.py")]
    );
    assert_eq!(manifest.file_count(), 14 + 1 + 2 + 1);
}

#[test]
fn test_manifest_serializes_as_destination_pairs() {
    let temp_dir = tempdir().unwrap();
    let mut config = BuildConfig::default();
    config.project_root = temp_dir.path().to_path_buf();

    let manifest = generate_data_files(&config, &temp_dir.path().join(".gitversion")).unwrap();
    let value = serde_json::to_value(&manifest).unwrap();

    assert_eq!(value[0][0], "");
    assert_eq!(value[0][1][0], ".gitversion");
    assert_eq!(value[2][0], "FDevIDs");
    assert_eq!(value[3][0], "plugins");
}

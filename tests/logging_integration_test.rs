use freezepack::LogCollector;
use log::LevelFilter;
use std::fs;

/// Integration test for the logging system
///
/// Tests that:
/// 1. LogCollector initializes its session files
/// 2. Detail lines reach only the full log
/// 3. Milestones reach both logs
/// 4. Global logger integration routes the `parsed` target
#[test]
fn test_logging_integration_full_cycle() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("logs");

    let collector =
        LogCollector::new(log_dir.clone(), LevelFilter::Off).expect("Failed to initialize LogCollector");
    let handle = collector.clone();
    collector
        .install(LevelFilter::Debug)
        .expect("Failed to register logger");

    log::info!("[Freeze] Running python with spec freeze-spec.json");
    log::debug!("[Executor] Spawning: python");
    log::trace!("dropped by max level");
    log::info!(target: "parsed", "PHASE TRANSITION: freeze");
    freezepack::log_parsed!("BUILD COMPLETED: {}", "dist.win32");

    handle.wait_for_empty().expect("Failed to flush logs");

    let full = fs::read_to_string(handle.full_log_path()).expect("Failed to read full log");
    let parsed = fs::read_to_string(handle.parsed_log_path()).expect("Failed to read parsed log");

    assert!(full.contains("[INFO] [Freeze] Running python"));
    assert!(full.contains("[DEBUG] [Executor] Spawning: python"));
    assert!(!full.contains("dropped by max level"));
    assert!(full.contains("PHASE TRANSITION: freeze"));

    assert!(parsed.contains("PHASE TRANSITION: freeze"));
    assert!(parsed.contains("BUILD COMPLETED: dist.win32"));
    assert!(!parsed.contains("[Freeze] Running python"));

    assert!(handle.full_log_path().starts_with(log_dir.join("full")));
    assert!(handle.parsed_log_path().starts_with(log_dir.join("parsed")));
}

//! Thresholds loaded from a settings file drive the analysis.

use crate::common::hub_and_spoke;
use clusterlens::{ClusterEngine, Recommendation, Role, Settings, logging};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_file_thresholds_change_the_verdict() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(".clusterlens").join("settings.toml");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"
debug = true

[analysis]
merge_threshold = 0.9
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert!(settings.debug);
    logging::init(settings.debug);

    let engine = ClusterEngine::build(hub_and_spoke(), settings.analysis);
    let spoke = engine.cluster("spoke").unwrap();
    assert_eq!(spoke.role, Role::Orphan);
    assert_eq!(spoke.verdict.recommendation, Recommendation::ReviewHighDup);
}

#[test]
fn test_saved_settings_round_trip_through_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("settings.toml");

    let mut settings = Settings::default();
    settings.analysis.min_url_count = 25;
    settings.save(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.analysis.min_url_count, 25);
    assert_eq!(loaded.version, settings.version);
}

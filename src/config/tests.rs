//! Integration tests for the configuration system.
//!
//! Covers validation, serialization, environment variable parsing and presets.

use super::*;
use crate::error::HashVizError;
use crate::hash_map::{Mode, SearchTermination, DEFAULT_PRIMARY_EXPR, MAX_TABLE_SIZE};
use std::env;
use std::fs;
use tempfile::tempdir;

/// Defaults are valid and match the documented values
#[test]
fn test_default_config() {
    let config = VisualizerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.table_size, 10);
    assert_eq!(config.primary_expr, DEFAULT_PRIMARY_EXPR);
    assert_eq!(config.step_interval_ms, 500);
    assert!(!config.auto_play);
    assert_eq!(config.search_termination, SearchTermination::FullScan);
    assert_eq!(config.initial_mode, Mode::Chain);
}

/// Test all preset configurations are valid
#[test]
fn test_all_presets_valid() {
    assert!(VisualizerConfig::performance_preset().validate().is_ok());
    assert!(VisualizerConfig::memory_preset().validate().is_ok());
    assert!(VisualizerConfig::realtime_preset().validate().is_ok());
    assert!(VisualizerConfig::balanced_preset().validate().is_ok());

    assert_eq!(VisualizerConfig::realtime_preset().step_interval_ms, 0);
    assert_eq!(
        VisualizerConfig::balanced_preset(),
        VisualizerConfig::default()
    );
}

/// Invalid values are rejected by validation
#[test]
fn test_validation_failures() {
    let mut config = VisualizerConfig::default();
    config.table_size = 2;
    let err = config.validate().unwrap_err();
    assert_eq!(err.category(), "validation");

    let mut config = VisualizerConfig::default();
    config.table_size = MAX_TABLE_SIZE + 1;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, HashVizError::InvalidTableSize { .. }));

    config.table_size = MAX_TABLE_SIZE;
    assert!(config.validate().is_ok());

    let mut config = VisualizerConfig::default();
    config.step_interval_ms = visualizer::MAX_STEP_INTERVAL_MS + 1;
    assert!(config.validate().is_err());

    let mut config = VisualizerConfig::default();
    config.trace_capacity = 0;
    assert!(config.validate().is_err());
}

/// Builder applies every setter and validates on build
#[test]
fn test_builder() {
    let config = VisualizerConfig::builder()
        .table_size(11)
        .primary_expr("(3 * key + 1) % tableSize")
        .secondary_expr("7 - (key % 7)")
        .step_interval_ms(250)
        .auto_play(true)
        .search_termination(SearchTermination::StopAtEmpty)
        .initial_mode(Mode::Double)
        .trace_capacity(64)
        .build()
        .unwrap();

    assert_eq!(config.table_size, 11);
    assert_eq!(config.secondary_expr, "7 - (key % 7)");
    assert_eq!(config.step_interval_ms, 250);
    assert!(config.auto_play);
    assert_eq!(config.search_termination, SearchTermination::StopAtEmpty);
    assert_eq!(config.initial_mode, Mode::Double);
    assert_eq!(config.trace_capacity, 64);

    assert!(VisualizerConfig::builder().table_size(1).build().is_err());
}

/// Test environment variable parsing
#[test]
fn test_environment_variable_parsing() {
    unsafe { env::set_var("HVTEST_TABLE_SIZE", "13"); }
    unsafe { env::set_var("HVTEST_PRIMARY_EXPR", "key * 3 % tableSize"); }
    unsafe { env::set_var("HVTEST_STEP_INTERVAL_MS", "120"); }
    unsafe { env::set_var("HVTEST_AUTO_PLAY", "yes"); }
    unsafe { env::set_var("HVTEST_SEARCH_TERMINATION", "stop_at_empty"); }
    unsafe { env::set_var("HVTEST_MODE", "quadratic"); }
    unsafe { env::set_var("HVTEST_TRACE_CAPACITY", "not a number"); }

    let config = VisualizerConfig::from_env_with_prefix("HVTEST_").unwrap();
    assert_eq!(config.table_size, 13);
    assert_eq!(config.primary_expr, "key * 3 % tableSize");
    assert_eq!(config.step_interval_ms, 120);
    assert!(config.auto_play);
    assert_eq!(config.search_termination, SearchTermination::StopAtEmpty);
    assert_eq!(config.initial_mode, Mode::Quad);
    // Unparsable values keep their default
    assert_eq!(config.trace_capacity, VisualizerConfig::default().trace_capacity);

    for var in [
        "HVTEST_TABLE_SIZE",
        "HVTEST_PRIMARY_EXPR",
        "HVTEST_STEP_INTERVAL_MS",
        "HVTEST_AUTO_PLAY",
        "HVTEST_SEARCH_TERMINATION",
        "HVTEST_MODE",
        "HVTEST_TRACE_CAPACITY",
    ] {
        unsafe { env::remove_var(var); }
    }
}

/// An environment value that parses but fails validation is an error
#[test]
fn test_environment_invalid_value() {
    unsafe { env::set_var("HVBAD_TABLE_SIZE", "2"); }
    assert!(VisualizerConfig::from_env_with_prefix("HVBAD_").is_err());
    unsafe { env::remove_var("HVBAD_TABLE_SIZE"); }
}

/// Test boolean environment variable parsing
#[test]
fn test_environment_boolean_parsing() {
    let test_cases = [
        ("true", true),
        ("TRUE", true),
        ("1", true),
        ("yes", true),
        ("on", true),
        ("false", false),
        ("0", false),
        ("off", false),
        ("garbage", false),
    ];

    for (value, expected) in test_cases.iter() {
        unsafe { env::set_var("HVTEST_BOOL_VALUE", value); }
        let result = parse_env_bool("HVTEST_BOOL_VALUE", !expected);
        assert_eq!(result, *expected, "Failed for value: '{}'", value);
    }

    unsafe { env::remove_var("HVTEST_BOOL_VALUE"); }
    assert!(parse_env_bool("HVTEST_BOOL_VALUE", true));
}

/// Test file serialization and deserialization
#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("visualizer.json");

    let config = VisualizerConfig::builder()
        .table_size(7)
        .initial_mode(Mode::Linear)
        .build()
        .unwrap();
    config.save_to_file(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\"initial_mode\": \"linear\""));
    assert!(contents.contains("\"search_termination\": \"full_scan\""));

    let loaded = VisualizerConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

/// Missing fields take defaults; invalid content is rejected
#[test]
fn test_load_partial_and_invalid_files() {
    let dir = tempdir().unwrap();

    let partial = dir.path().join("partial.json");
    fs::write(&partial, r#"{ "table_size": 5 }"#).unwrap();
    let loaded = VisualizerConfig::load_from_file(&partial).unwrap();
    assert_eq!(loaded.table_size, 5);
    assert_eq!(loaded.step_interval_ms, 500);

    let too_small = dir.path().join("small.json");
    fs::write(&too_small, r#"{ "table_size": 1 }"#).unwrap();
    assert!(VisualizerConfig::load_from_file(&too_small).is_err());

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "not json").unwrap();
    let err = VisualizerConfig::load_from_file(&garbage).unwrap_err();
    assert_eq!(err.category(), "config");

    let huge = dir.path().join("huge.json");
    fs::write(&huge, r#"{ "table_size": 1000000000000 }"#).unwrap();
    let err = VisualizerConfig::load_from_file(&huge).unwrap_err();
    assert!(matches!(err, HashVizError::InvalidTableSize { .. }));

    let err = VisualizerConfig::load_from_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, HashVizError::Io(_)));
    assert_eq!(err.category(), "io");
}

/// Write failures surface as I/O errors
#[test]
fn test_save_to_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("visualizer.json");
    let err = VisualizerConfig::default().save_to_file(&path).unwrap_err();
    assert!(matches!(err, HashVizError::Io(_)));
}

/// Speed slider mapping
#[test]
fn test_speed_to_interval() {
    assert_eq!(VisualizerConfig::speed_to_interval(0), 1000);
    assert_eq!(VisualizerConfig::speed_to_interval(5), 600);
    assert_eq!(VisualizerConfig::speed_to_interval(10), 200);
    assert_eq!(
        VisualizerConfig::speed_to_interval(visualizer::MAX_SPEED_LEVEL),
        200
    );
    assert_eq!(VisualizerConfig::speed_to_interval(12), 200);
    assert_eq!(VisualizerConfig::speed_to_interval(u32::MAX), 200);
}

/// Free-form table size input
#[test]
fn test_table_size_from_input() {
    assert_eq!(VisualizerConfig::table_size_from_input("11"), 11);
    assert_eq!(VisualizerConfig::table_size_from_input(" 12abc"), 12);
    assert_eq!(VisualizerConfig::table_size_from_input(""), 10);
    assert_eq!(VisualizerConfig::table_size_from_input("abc"), 10);
    assert_eq!(VisualizerConfig::table_size_from_input("0"), 10);
    assert_eq!(VisualizerConfig::table_size_from_input("2"), 3);
    assert_eq!(VisualizerConfig::table_size_from_input("-5"), 3);
    assert_eq!(VisualizerConfig::table_size_from_input("+7"), 7);
    assert_eq!(
        VisualizerConfig::table_size_from_input("99999999999999"),
        99_999_999_999_999
    );
}

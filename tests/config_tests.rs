// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use bodysnap::backends::camera::{CameraBackendType, Facing};
use bodysnap::{AppError, Config, FilterParameters};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.default_facing, Facing::User);
    assert_eq!(config.jpeg_quality, 92);
    assert!(config.filter_enabled, "Filter should be enabled by default");
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bodysnap").join("config.json");

    let mut config = Config::default();
    config.backend = CameraBackendType::Virtual;
    config.default_facing = Facing::Environment;
    config.environment_device = Some("/dev/video2".into());
    config.filter = FilterParameters::new(1.1, 1.0, 0.8).unwrap();
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}

#[test]
fn test_out_of_range_quality_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"jpeg_quality": 0}"#).unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}

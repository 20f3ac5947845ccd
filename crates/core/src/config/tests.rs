//! Tests for configuration module

use super::*;
use crate::error::{Error, Result};
use std::io::Write;
use tempfile::NamedTempFile;

fn create_temp_config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|e| Error::config(format!("Failed to create temp file: {e}")))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::config(format!("Failed to write temp file: {e}")))?;
    file.flush()
        .map_err(|e| Error::config(format!("Failed to flush temp file: {e}")))?;
    Ok(file)
}

fn with_env_var<F, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    std::env::set_var(key, value);
    let result = f();
    std::env::remove_var(key);
    result
}

#[test]
fn test_from_toml_str_valid() {
    let toml = r#"
        [markers]
        entity_markers = ["Entity"]

        [scanner]
        key_lookahead = 20

        [codegen]
        validation_namespace = "acme::validation"
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse valid TOML");
    assert_eq!(config.markers.entity_markers, vec!["Entity".to_string()]);
    assert_eq!(config.scanner.key_lookahead, 20);
    assert_eq!(config.scanner.class_lookahead, 10);
    assert_eq!(config.codegen.validation_namespace, "acme::validation");
    assert_eq!(config.codegen.serializer_namespace, "nayan::serializer");
}

#[test]
fn test_from_toml_str_empty_uses_defaults() {
    let config = Config::from_toml_str("").expect("Failed to parse empty TOML");
    assert_eq!(
        config.markers.entity_markers,
        vec!["Entity".to_string(), "Serializable".to_string()]
    );
    assert_eq!(config.markers.key_marker, "Id");
    assert_eq!(config.markers.repository_marker, "Repository");
    assert_eq!(config.scanner.validation_lookahead, 10);
    assert_eq!(config.scanner.key_lookahead, 15);
    assert_eq!(config.codegen.indent, "    ");
    assert_eq!(config.repository.base_interface, "CpaRepository");
    assert_eq!(config.repository.base_impl, "CpaRepositoryImpl");
    assert_eq!(config.repository.output_subdir, "src/repository");
    assert_eq!(config.discovery.project_marker, "platformio.ini");
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_invalid_syntax() {
    let toml = r#"
        [scanner
        key_lookahead = 3
    "#;

    let result = Config::from_toml_str(toml);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Failed to parse TOML"));
}

#[test]
fn test_validate_zero_lookahead() {
    let toml = r#"
        [scanner]
        validation_lookahead = 0
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse TOML");
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("scanner.validation_lookahead"));
}

#[test]
fn test_validate_empty_entity_markers() {
    let toml = r#"
        [markers]
        entity_markers = []
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse TOML");
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("entity_markers"));
}

#[test]
fn test_validate_marker_with_at_sign() {
    let mut config = Config::default();
    config.markers.key_marker = "@Id".to_string();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid marker name '@Id'"));
}

#[test]
fn test_validate_extension_without_dot() {
    let mut config = Config::default();
    config.discovery.extensions = vec!["h".to_string()];
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid extension 'h'"));
}

#[test]
fn test_from_file_loads_successfully() {
    let toml = r#"
        [repository]
        output_subdir = "include/generated"

        [discovery]
        extensions = [".h"]
    "#;

    let temp_file = create_temp_config_file(toml).expect("Failed to create temp config file");
    let config = Config::from_file(temp_file.path()).expect("Failed to load config from file");
    assert_eq!(config.repository.output_subdir, "include/generated");
    assert_eq!(config.discovery.extensions, vec![".h".to_string()]);
    assert_eq!(config.discovery.exclude_dirs.len(), 5);
}

#[test]
fn test_from_file_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::from_file(&dir.path().join("absent.toml"))
        .expect("Missing config file should fall back to defaults");
    assert_eq!(config.scanner.key_lookahead, 15);
    assert_eq!(config.repository.pointer_macro, "DefineStandardPointers");
}

#[test]
fn test_from_file_env_override() {
    let temp_file = create_temp_config_file("").expect("Failed to create temp config file");
    with_env_var("HEADERGEN_SCANNER__CLASS_LOOKAHEAD", "12", || {
        let config =
            Config::from_file(temp_file.path()).expect("Failed to load config from file");
        assert_eq!(config.scanner.class_lookahead, 12);
        assert_eq!(config.scanner.key_lookahead, 15);
    });
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let toml = r#"
        [scanner]
        key_lookahead = 0
    "#;

    let temp_file = create_temp_config_file(toml).expect("Failed to create temp config file");
    let result = Config::from_file(temp_file.path());
    assert!(result.is_err());
}

#[test]
fn test_resolve_config_path_prefers_explicit() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "").expect("Failed to write config");
    let explicit = dir.path().join("custom.toml");
    let resolved = resolve_config_path(Some(&explicit), Some(dir.path()))
        .expect("Failed to resolve config path");
    assert_eq!(resolved, explicit);
}

#[test]
fn test_resolve_config_path_uses_project_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let project_file = dir.path().join(PROJECT_CONFIG_FILE);
    std::fs::write(&project_file, "").expect("Failed to write config");
    let resolved =
        resolve_config_path(None, Some(dir.path())).expect("Failed to resolve config path");
    assert_eq!(resolved, project_file);
}

#[test]
fn test_discovery_is_header() {
    let discovery = DiscoveryConfig::default();
    assert!(discovery.is_header(Path::new("include/User.h")));
    assert!(discovery.is_header(Path::new("include/User.HPP")));
    assert!(!discovery.is_header(Path::new("src/User.cpp")));
    assert!(!discovery.is_header(Path::new("Makefile")));
}

#[test]
fn test_discovery_skips_libraries_case_insensitively() {
    let discovery = DiscoveryConfig::default();
    assert!(discovery.is_skipped_library("ArduinoJson"));
    assert!(discovery.is_skipped_library("arduinojson-src"));
    assert!(!discovery.is_skipped_library("nayan-serializer"));
}

//! Configuration loading, precedence and validation tests

use ivm_config::{
    ConfigError, ConfigLoader, DEFAULT_MAX_CALL_DEPTH, DEFAULT_STACK_SIZE, PROJECT_CONFIG_FILE,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join(PROJECT_CONFIG_FILE);
    fs::write(&config_path, content).unwrap();
    config_path
}

/// Loader that ignores the real ~/.ivm/config.toml
fn isolated_loader(dir: &Path) -> ConfigLoader {
    ConfigLoader::with_global_config_path(dir.join("no-such-global.toml"))
}

fn clear_env() {
    env::remove_var("IVM_STACK_SIZE");
    env::remove_var("IVM_MAX_CALL_DEPTH");
    env::remove_var("IVM_TRACE");
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
#[serial]
fn test_defaults_without_any_config() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    let config = isolated_loader(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert!(!config.is_project());
    assert_eq!(config.vm.stack_size, DEFAULT_STACK_SIZE);
    assert_eq!(config.vm.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    assert!(!config.vm.trace);
}

#[test]
#[serial]
fn test_partial_section_keeps_other_defaults() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[vm]\ntrace = true\n");

    let config = isolated_loader(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert!(config.vm.trace);
    assert_eq!(config.vm.stack_size, DEFAULT_STACK_SIZE);
    assert_eq!(config.project_root(), Some(temp_dir.path()));
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
#[serial]
fn test_env_beats_project_beats_global() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let global = temp_dir.path().join("global.toml");
    fs::write(
        &global,
        "[vm]\nstack_size = 10\nmax_call_depth = 20\ntrace = true\n",
    )
    .unwrap();
    create_config_file(temp_dir.path(), "[vm]\nstack_size = 30\n");
    env::set_var("IVM_MAX_CALL_DEPTH", "40");

    let result = ConfigLoader::with_global_config_path(global).load_from_directory(temp_dir.path());
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.vm.stack_size, 30);
    assert_eq!(config.vm.max_call_depth, 40);
    assert!(config.vm.trace);
}

#[rstest]
#[case("true", true)]
#[case("1", true)]
#[case("YES", true)]
#[case("false", false)]
#[case("0", false)]
#[serial]
fn test_env_trace_values(#[case] value: &str, #[case] expected: bool) {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[vm]\ntrace = true\n");
    env::set_var("IVM_TRACE", value);

    let result = isolated_loader(temp_dir.path()).load_from_directory(temp_dir.path());
    clear_env();

    assert_eq!(result.unwrap().vm.trace, expected);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
#[serial]
fn test_explicit_missing_file_is_not_found() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.toml");

    let err = isolated_loader(temp_dir.path())
        .load_from_file(&missing)
        .unwrap_err();

    assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
}

#[rstest]
#[case("[vm]\nstack_size = 0\n", "vm.stack_size")]
#[case("[vm]\nmax_call_depth = 0\n", "vm.max_call_depth")]
#[serial]
fn test_zero_capacities_rejected(#[case] content: &str, #[case] expected_field: &str) {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), content);

    let err = isolated_loader(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap_err();

    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_zero_stack_size_from_env_rejected() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("IVM_STACK_SIZE", "0");

    let result = isolated_loader(temp_dir.path()).load_from_directory(temp_dir.path());
    clear_env();

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
#[serial]
fn test_unknown_key_is_parse_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[vm]\nheap_size = 5\n");

    let err = isolated_loader(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap_err();

    match err {
        ConfigError::TomlParseError { file, .. } => assert_eq!(file, path),
        other => panic!("expected TomlParseError, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_malformed_toml_names_the_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[vm\nstack_size = ");

    let err = isolated_loader(temp_dir.path())
        .load_from_directory(temp_dir.path())
        .unwrap_err();

    assert!(err.to_string().contains(PROJECT_CONFIG_FILE));
}

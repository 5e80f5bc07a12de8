//! Configuration and data folder resolution tests
//!
//! Tests that manipulate ROLLCALL_DATA_FOLDER or ROLLCALL_DATA are
//! marked #[serial] to prevent environment variable races between
//! parallel test threads.

use rollcall_common::config::{
    CompiledDefaults, DataFolderInitializer, DataFolderResolver, LoggingConfig, TomlConfig,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.data_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());

    #[cfg(target_os = "linux")]
    {
        let path_str = defaults.data_folder.to_string_lossy();
        assert!(
            path_str.contains("rollcall"),
            "Linux default should live under a rollcall directory"
        );
    }
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var("ROLLCALL_DATA_FOLDER");
    env::remove_var("ROLLCALL_DATA");

    let resolver = DataFolderResolver::new("test-module");
    let data_folder = resolver.resolve();

    assert!(!data_folder.as_os_str().is_empty());

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(data_folder, defaults.data_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_data_folder() {
    let test_path = "/tmp/rollcall-test-env-folder";
    env::set_var("ROLLCALL_DATA_FOLDER", test_path);

    let resolver = DataFolderResolver::new("test-module");
    let data_folder = resolver.resolve();

    assert_eq!(data_folder, PathBuf::from(test_path));

    env::remove_var("ROLLCALL_DATA_FOLDER");
}

#[test]
#[serial]
fn test_resolver_env_var_data() {
    let test_path = "/tmp/rollcall-test-env-data";
    env::set_var("ROLLCALL_DATA", test_path);

    let resolver = DataFolderResolver::new("test-module");
    let data_folder = resolver.resolve();

    assert_eq!(data_folder, PathBuf::from(test_path));

    env::remove_var("ROLLCALL_DATA");
}

#[test]
#[serial]
fn test_resolver_data_folder_var_takes_precedence() {
    env::remove_var("ROLLCALL_DATA_FOLDER");
    env::remove_var("ROLLCALL_DATA");

    env::set_var("ROLLCALL_DATA_FOLDER", "/tmp/rollcall-priority-1");
    env::set_var("ROLLCALL_DATA", "/tmp/rollcall-priority-2");

    let resolver = DataFolderResolver::new("test-module");
    let data_folder = resolver.resolve();

    assert_eq!(data_folder, PathBuf::from("/tmp/rollcall-priority-1"));

    env::remove_var("ROLLCALL_DATA_FOLDER");
    env::remove_var("ROLLCALL_DATA");
}

#[test]
#[serial]
fn test_explicit_path_beats_environment() {
    env::set_var("ROLLCALL_DATA_FOLDER", "/tmp/rollcall-env-loses");

    let resolver = DataFolderResolver::new("test-module")
        .with_explicit(Some(PathBuf::from("/tmp/rollcall-explicit-wins")));
    let data_folder = resolver.resolve();

    assert_eq!(data_folder, PathBuf::from("/tmp/rollcall-explicit-wins"));

    env::remove_var("ROLLCALL_DATA_FOLDER");
}

#[test]
#[serial]
fn test_resolver_missing_config_file_does_not_error() {
    env::remove_var("ROLLCALL_DATA_FOLDER");
    env::remove_var("ROLLCALL_DATA");

    // A module name that definitely has no config file
    let resolver = DataFolderResolver::new("nonexistent-test-module-12345");

    // Should not panic - should return compiled default
    let data_folder = resolver.resolve();

    assert!(!data_folder.as_os_str().is_empty());

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(data_folder, defaults.data_folder);
}

#[test]
fn test_initializer_database_path() {
    let root = PathBuf::from("/tmp/rollcall-test-root");
    let initializer = DataFolderInitializer::new(root.clone());

    let db_path = initializer.database_path();
    assert_eq!(db_path, root.join("rollcall.db"));
}

#[test]
fn test_initializer_database_exists() {
    let root = PathBuf::from("/tmp/rollcall-test-nonexistent");
    let initializer = DataFolderInitializer::new(root);

    assert!(!initializer.database_exists());
}

#[test]
fn test_initializer_creates_directory() {
    let test_dir = format!("/tmp/rollcall-test-create-{}", std::process::id());
    let root = PathBuf::from(&test_dir);

    let _ = std::fs::remove_dir_all(&root);

    let initializer = DataFolderInitializer::new(root.clone());
    let result = initializer.ensure_directory_exists();

    assert!(result.is_ok(), "Failed to create directory: {:?}", result.err());
    assert!(root.exists(), "Directory was not created");
    assert!(root.is_dir(), "Created path is not a directory");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_initializer_idempotent_directory_creation() {
    let test_dir = format!("/tmp/rollcall-test-idempotent-{}", std::process::id());
    let root = PathBuf::from(&test_dir);

    let _ = std::fs::remove_dir_all(&root);

    let initializer = DataFolderInitializer::new(root.clone());

    let result1 = initializer.ensure_directory_exists();
    assert!(result1.is_ok());

    let result2 = initializer.ensure_directory_exists();
    assert!(result2.is_ok());

    assert!(root.exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_initializer_nested_directory_creation() {
    let base = format!("/tmp/rollcall-test-nested-{}", std::process::id());
    let root = PathBuf::from(&base).join("level1").join("level2");

    let _ = std::fs::remove_dir_all(&base);

    let initializer = DataFolderInitializer::new(root.clone());
    let result = initializer.ensure_directory_exists();

    assert!(result.is_ok(), "Failed to create nested directories: {:?}", result.err());
    assert!(root.exists(), "Nested directory was not created");

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn test_toml_roundtrip() {
    let config = TomlConfig {
        data_folder: Some(PathBuf::from("/troop/data")),
        logging: LoggingConfig::default(),
    };

    let toml_str = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&toml_str).unwrap();

    assert_eq!(parsed.data_folder, Some(PathBuf::from("/troop/data")));
    assert_eq!(parsed.logging.level, "info");
}

#[test]
fn test_backward_compatible_missing_fields() {
    // Older config files without the logging section still load
    let toml_str = r#"
        data_folder = "/troop/data"
    "#;

    let config: TomlConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.data_folder, Some(PathBuf::from("/troop/data")));
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_empty_config_file_loads() {
    let config: TomlConfig = toml::from_str("").unwrap();
    assert_eq!(config.data_folder, None);
    assert_eq!(config.logging.level, "info");
}

//! Tests for the show-config and create-config CLI commands

use crate::common::test_config;
use hister::cli::commands::config::{execute_create, execute_show, ConfigArgs, CreateConfigArgs};
use hister::cli::OutputFormat;
use hister::Config;
use tempfile::TempDir;

/// Test show-config in both formats
#[test]
fn test_show_config() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());

    for format in [OutputFormat::Human, OutputFormat::Json] {
        for paths in [false, true] {
            assert!(execute_show(ConfigArgs { paths }, &config, format).is_ok());
        }
    }
}

/// Test that a created config file loads back as the defaults
#[test]
fn test_create_config_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    let args = CreateConfigArgs {
        filename: Some(path.clone()),
        force: false,
    };
    execute_create(args, OutputFormat::Human).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    let defaults = Config::default();
    assert_eq!(loaded.search.default_limit, defaults.search.default_limit);
    assert_eq!(
        loaded.sensitive_content_patterns,
        defaults.sensitive_content_patterns
    );
}

/// Test that an existing file is only replaced with --force
#[test]
fn test_create_config_requires_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "# mine\n").unwrap();

    let args = CreateConfigArgs {
        filename: Some(path.clone()),
        force: false,
    };
    assert!(execute_create(args, OutputFormat::Human).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

    let args = CreateConfigArgs {
        filename: Some(path.clone()),
        force: true,
    };
    execute_create(args, OutputFormat::Json).unwrap();
    assert!(Config::from_file(&path).is_ok());
}

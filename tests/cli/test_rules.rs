//! Tests for the rules CLI subcommands

use crate::common::test_config;
use hister::cli::commands::rules::{execute, RulesCommand};
use hister::cli::OutputFormat;
use hister::core::rules::RulesStore;
use tempfile::TempDir;

/// Test that edits are persisted to the rules file
#[test]
fn test_rules_edits_persist() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());

    execute(
        RulesCommand::AddAlias {
            keyword: "gh".to_string(),
            value: "domain:github.com".to_string(),
        },
        &config,
        OutputFormat::Json,
    )
    .unwrap();
    execute(
        RulesCommand::SetPriority {
            patterns: vec!["docs\\.rs".to_string()],
        },
        &config,
        OutputFormat::Human,
    )
    .unwrap();

    let rules = RulesStore::load(config.rules_path()).unwrap().current();
    assert_eq!(rules.resolve_aliases("gh tokio"), "domain:github.com tokio");
    assert!(rules.is_priority("https://docs.rs/serde"));

    execute(
        RulesCommand::DeleteAlias {
            keyword: "gh".to_string(),
        },
        &config,
        OutputFormat::Human,
    )
    .unwrap();
    let rules = RulesStore::load(config.rules_path()).unwrap().current();
    assert!(rules.aliases().is_empty());
}

/// Test that an invalid pattern is rejected and nothing is saved
#[test]
fn test_rules_invalid_pattern_rejected() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());

    let result = execute(
        RulesCommand::SetSkip {
            patterns: vec!["(unclosed".to_string()],
        },
        &config,
        OutputFormat::Human,
    );
    assert!(result.is_err());

    let rules = RulesStore::load(config.rules_path()).unwrap().current();
    assert!(rules.to_data().skip.is_empty());
}

/// Test showing rules when no rules file exists
#[test]
fn test_rules_show_defaults() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());

    assert!(execute(RulesCommand::Show, &config, OutputFormat::Human).is_ok());
    assert!(execute(RulesCommand::Show, &config, OutputFormat::Json).is_ok());
}

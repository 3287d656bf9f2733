//! Tests for the delete, list-urls and reindex CLI commands

use crate::cli::test_helpers::create_indexed_services;
use crate::common::{add_pages, test_config, CORPUS};
use hister::cli::commands::{delete, list, reindex};
use hister::cli::OutputFormat;
use hister::core::rules::RulesStore;
use hister::Services;
use tempfile::TempDir;

/// Test deleting a page by a non-canonical form of its URL
#[tokio::test]
async fn test_delete_uses_canonical_url() {
    let (services, _temp) = create_indexed_services(CORPUS).await;

    let args = delete::DeleteArgs {
        urls: vec![format!("{}?utm_campaign=x", CORPUS[0].url)],
    };
    delete::execute(args, &services, OutputFormat::Json)
        .await
        .unwrap();

    assert_eq!(services.indexer.count().unwrap(), CORPUS.len() as u64 - 1);
    assert!(services.indexer.get_by_url(CORPUS[0].url).unwrap().is_none());
}

/// Test deleting an unknown URL
#[tokio::test]
async fn test_delete_unknown_url_succeeds() {
    let (services, _temp) = create_indexed_services(CORPUS).await;

    let args = delete::DeleteArgs {
        urls: vec!["https://unknown.example/".to_string()],
    };
    let result = delete::execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok());
    assert_eq!(services.indexer.count().unwrap(), CORPUS.len() as u64);
}

/// Test listing in every output mode
#[tokio::test]
async fn test_list_urls() {
    let (services, _temp) = create_indexed_services(CORPUS).await;

    for (verbose, format) in [
        (false, OutputFormat::Human),
        (true, OutputFormat::Human),
        (false, OutputFormat::Json),
    ] {
        let result = list::execute(list::ListArgs { verbose }, &services, format).await;
        assert!(result.is_ok());
    }
}

/// Test reindexing applies skip rules saved after indexing
#[tokio::test]
async fn test_reindex_applies_rules() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    {
        let services = Services::new(config.clone()).unwrap();
        add_pages(&services, CORPUS).await;
    }

    RulesStore::load(config.rules_path())
        .unwrap()
        .set_skip(vec!["news\\.example\\.com".to_string()])
        .unwrap();

    let args = reindex::ReindexArgs {
        exclude_sensitive: true,
        quiet: true,
    };
    reindex::execute(args, &config, OutputFormat::Json).unwrap();

    let services = Services::new(config).unwrap();
    assert_eq!(services.indexer.count().unwrap(), CORPUS.len() as u64 - 1);
}

/// Test reindexing without an index
#[test]
fn test_reindex_without_index_fails() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());

    let args = reindex::ReindexArgs {
        exclude_sensitive: false,
        quiet: true,
    };
    assert!(reindex::execute(args, &config, OutputFormat::Human).is_err());
}

//! Ranking tests: priority rules, title matches and user boosts

use crate::common::{create_test_services, page_html};
use hister::core::types::{Document, Query, SortOrder};
use hister::Services;

const PRIORITY_URL: &str = "https://docs.example.com/guide";
const PLAIN_URL: &str = "https://blog.example.com/guide";

async fn add(services: &Services, url: &str, title: &str, body: &str) {
    services
        .add_document(Document::new(url, page_html(title, body)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_priority_rule_ranks_higher() {
    let (services, _temp) = create_test_services();
    // Same content under two URLs
    add(&services, PLAIN_URL, "Guide", "tokio runtime guide").await;
    add(&services, PRIORITY_URL, "Guide", "tokio runtime guide").await;

    let before = services.search(Query::new("runtime")).unwrap();
    assert_eq!(before.documents.len(), 2);
    let base = before.documents[0].score;
    assert!((before.documents[1].score - base).abs() < 1e-4);

    services
        .rules
        .set_priority(vec![r"docs\.example\.com".to_string()])
        .unwrap();

    let after = services.search(Query::new("runtime")).unwrap();
    assert_eq!(after.documents[0].url, PRIORITY_URL);
    assert_eq!(after.documents[1].url, PLAIN_URL);
    assert!(after.documents[0].score > after.documents[1].score);

    let boost = services.config.search.priority_boost;
    assert!((after.documents[0].score - base * boost).abs() < base * 1e-3);
}

#[tokio::test]
async fn test_priority_applies_to_date_sorted_results() {
    let (services, _temp) = create_test_services();
    add(&services, PLAIN_URL, "Guide", "tokio runtime guide").await;
    add(&services, PRIORITY_URL, "Guide", "tokio runtime guide").await;
    services
        .rules
        .set_priority(vec!["docs".to_string()])
        .unwrap();

    let mut query = Query::new("runtime");
    query.sort = SortOrder::Newest;
    let results = services.search(query).unwrap();

    let score_of = |url: &str| {
        results
            .documents
            .iter()
            .find(|d| d.url == url)
            .map(|d| d.score)
            .unwrap()
    };
    assert!(score_of(PRIORITY_URL) > score_of(PLAIN_URL));
}

#[tokio::test]
async fn test_title_match_ranks_higher() {
    let (services, _temp) = create_test_services();
    add(
        &services,
        "https://a.example.com/",
        "Notes",
        "runtime internals and scheduling",
    )
    .await;
    add(
        &services,
        "https://b.example.com/",
        "Runtime internals",
        "notes about scheduling",
    )
    .await;

    let results = services.search(Query::new("runtime")).unwrap();
    assert_eq!(results.documents.len(), 2);
    assert_eq!(results.documents[0].url, "https://b.example.com/");
}

#[tokio::test]
async fn test_user_boost_scales_scores() {
    let (services, _temp) = create_test_services();
    add(&services, PLAIN_URL, "Guide", "tokio runtime guide").await;

    let plain = services.search(Query::new("tokio")).unwrap();
    let boosted = services
        .search(Query::new("tokio").with_boost(2.0))
        .unwrap();

    let base = plain.documents[0].score;
    assert!((boosted.documents[0].score - 2.0 * base).abs() < base * 1e-3);
}

#[tokio::test]
async fn test_alias_expands_before_ranking() {
    let (services, _temp) = create_test_services();
    add(&services, PLAIN_URL, "Guide", "tokio runtime guide").await;
    services.rules.add_alias("rt", "runtime").unwrap();

    let results = services.search(Query::new("rt")).unwrap();
    assert_eq!(results.total, 1);
    assert_eq!(results.query.text, "rt");
}

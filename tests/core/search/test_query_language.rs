//! Query language tests against a small indexed corpus

use crate::common::{add_pages, create_test_services, CORPUS};
use hister::core::search::{compile_text, tokenize, CompiledQuery, Token};
use hister::core::types::{Document, Query, SortOrder};
use hister::HisterError;

fn urls(results: &hister::Results) -> Vec<&str> {
    let mut urls: Vec<&str> = results.documents.iter().map(|d| d.url.as_str()).collect();
    urls.sort();
    urls
}

#[test]
fn test_tokenizer_example() {
    let tokens = tokenize(r#"foo "bar baz" (a|b|c) -qux field:val"#).unwrap();

    assert_eq!(tokens.len(), 5);
    assert_eq!(tokens[0], Token::Word("foo".to_string()));
    assert_eq!(tokens[1], Token::Quoted("bar baz".to_string()));
    match &tokens[2] {
        Token::Alternation { parts, .. } => assert_eq!(parts, &["a", "b", "c"]),
        other => panic!("expected alternation, got {other:?}"),
    }
    assert_eq!(tokens[3], Token::Word("-qux".to_string()));
    assert_eq!(tokens[4], Token::Word("field:val".to_string()));
}

#[test]
fn test_unmatched_delimiters_fail() {
    for input in [r#"foo "bar"#, "(a|b", "x (a|(b|c)", r#"title:"open"#, "\""] {
        assert!(
            matches!(tokenize(input), Err(HisterError::QuerySyntax(_))),
            "{input} should fail"
        );
    }
}

#[test]
fn test_compile_is_deterministic() {
    for text in [
        "rust",
        r#"rust "async runtime" -java"#,
        "(tokio|smol|async-std) url:*docs* domain:-example.com",
        "title:x* text:y? 日本語",
    ] {
        assert_eq!(compile_text(text, &[]), compile_text(text, &[]), "{text}");
    }
}

#[tokio::test]
async fn test_empty_query_returns_nothing() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    for text in ["", "   ", "\t\n"] {
        assert_eq!(compile_text(text, &[]), CompiledQuery::MatchNone);
        let results = services.search(Query::new(text)).unwrap();
        assert_eq!(results.total, 0);
        assert!(results.documents.is_empty());
    }
}

#[tokio::test]
async fn test_words_phrases_and_negation() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let results = services.search(Query::new("runtime")).unwrap();
    assert_eq!(results.total, 2);

    let results = services.search(Query::new("runtime -java")).unwrap();
    assert_eq!(urls(&results), vec!["https://tokio.rs/tokio/tutorial"]);

    let results = services
        .search(Query::new("\"asynchronous runtime\""))
        .unwrap();
    assert_eq!(urls(&results), vec!["https://tokio.rs/tokio/tutorial"]);

    // Every plain word must match
    let results = services.search(Query::new("runtime tutorial")).unwrap();
    assert_eq!(results.total, 1);
}

#[tokio::test]
async fn test_alternation() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let results = services.search(Query::new("(serde|spring)")).unwrap();
    assert_eq!(
        urls(&results),
        vec![
            "https://docs.rs/serde/latest/serde/",
            "https://spring.io/projects/spring-boot"
        ]
    );
}

#[tokio::test]
async fn test_field_scoped_terms() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let results = services.search(Query::new("domain:go.dev")).unwrap();
    assert_eq!(
        urls(&results),
        vec!["https://go.dev/doc/tutorial/getting-started"]
    );

    let results = services.search(Query::new("url:*docs.rs*")).unwrap();
    assert_eq!(urls(&results), vec!["https://docs.rs/serde/latest/serde/"]);

    let results = services.search(Query::new("title:tutorial")).unwrap();
    assert_eq!(urls(&results), vec!["https://tokio.rs/tokio/tutorial"]);

    // Plain words also match URLs
    let results = services.search(Query::new("tutorial")).unwrap();
    assert_eq!(results.total, 2);

    let results = services.search(Query::new("tutorial domain:-go.dev")).unwrap();
    assert_eq!(urls(&results), vec!["https://tokio.rs/tokio/tutorial"]);
}

#[tokio::test]
async fn test_fields_filter() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let mut query = Query::new("tutorial");
    query.fields = vec!["title".to_string()];
    let results = services.search(query).unwrap();
    assert_eq!(urls(&results), vec!["https://tokio.rs/tokio/tutorial"]);

    let mut query = Query::new("tutorial");
    query.fields = vec!["html".to_string()];
    assert!(matches!(
        services.search(query),
        Err(HisterError::InvalidQuery(_))
    ));
}

#[tokio::test]
async fn test_syntax_error_still_searches() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let results = services.search(Query::new("rust \"unterminated")).unwrap();
    assert!(results.total > 0);
}

#[tokio::test]
async fn test_paging() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let mut query = Query::new("rust");
    query.limit = Some(2);
    let first = services.search(query.clone()).unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.documents.len(), 2);

    query.offset = 2;
    let second = services.search(query).unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.documents.len(), 1);
    assert!(first
        .documents
        .iter()
        .all(|d| d.url != second.documents[0].url));
}

#[tokio::test]
async fn test_date_range_and_sorting() {
    let (services, _temp) = create_test_services();
    for (i, added) in [1_000_i64, 3_000, 2_000].into_iter().enumerate() {
        let mut doc = Document::new(
            format!("https://example.com/{i}"),
            crate::common::page_html("Rust notes", "rust"),
        );
        doc.added = added;
        services.indexer.add(doc).unwrap();
    }

    let mut query = Query::new("rust");
    query.sort = SortOrder::Newest;
    let results = services.search(query.clone()).unwrap();
    let added: Vec<i64> = results.documents.iter().map(|d| d.added).collect();
    assert_eq!(added, vec![3_000, 2_000, 1_000]);

    query.sort = SortOrder::Oldest;
    let results = services.search(query.clone()).unwrap();
    let added: Vec<i64> = results.documents.iter().map(|d| d.added).collect();
    assert_eq!(added, vec![1_000, 2_000, 3_000]);

    query.date_from = Some(1_500);
    query.date_to = Some(2_500);
    let results = services.search(query).unwrap();
    assert_eq!(results.total, 1);
    assert_eq!(results.documents[0].added, 2_000);
}

#[tokio::test]
async fn test_results_omit_html() {
    let (services, _temp) = create_test_services();
    add_pages(&services, CORPUS).await;

    let results = services.search(Query::new("serde")).unwrap();
    assert!(!results.documents.is_empty());
    assert!(results.documents.iter().all(|d| d.html.is_empty()));
    assert!(results.documents.iter().all(|d| d.score > 0.0));
}

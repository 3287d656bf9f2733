//! Multi-byte and malformed input tests

use crate::common::{create_test_services, page_html};
use hister::core::indexer::DocumentProcessor;
use hister::core::types::{Document, Highlight, Query};
use hister::Config;

#[test]
fn test_cjk_and_emoji_extracted_intact() {
    let p = DocumentProcessor::from_config(&Config::default()).unwrap();
    let mut doc = Document::new(
        "https://例え.jp/ページ",
        page_html("日本語のページ 🎉", "東京は日本の首都です 🗼"),
    );
    p.process(&mut doc).unwrap();

    assert_eq!(doc.title, "日本語のページ 🎉");
    assert_eq!(doc.text, "東京は日本の首都です 🗼");
    assert!(doc.url.starts_with("https://xn--"));
}

#[test]
fn test_malformed_html_does_not_panic() {
    let p = DocumentProcessor::from_config(&Config::default()).unwrap();
    let mut doc = Document::new(
        "https://example.com/",
        "<html><head><title>Broken<body><p>unclosed <b>bold <i>text</div></span>",
    );
    // Either outcome is fine, it must not panic
    let _ = p.process(&mut doc);
}

#[tokio::test]
async fn test_highlight_multibyte_preview() {
    let (services, _temp) = create_test_services();
    let body = format!("{} Zürich café {}", "ä".repeat(50), "ö".repeat(50));
    services
        .add_document(Document::new("https://example.ch/", page_html("Café", &body)))
        .await
        .unwrap();

    let mut query = Query::new("zürich");
    query.highlight = Highlight::Tui;
    let results = services.search(query).unwrap();

    assert_eq!(results.total, 1);
    assert!(
        results.documents[0].text.contains("[Zürich]"),
        "{}",
        results.documents[0].text
    );
}

//! HTML content extraction strategies.
//!
//! A [`DocumentProcessor`](super::DocumentProcessor) owns an ordered
//! list of [`Extractor`]s. Each is asked whether it handles a page; the
//! first one that extracts successfully wins.

use crate::core::error::{HisterError, Result};
use crate::core::indexer::url::resolve;
use crate::core::types::Document;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static ICON_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("link[rel][href]").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").unwrap());
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"][content]"#).unwrap());

/// Elements whose text is never indexed
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Content pulled out of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub text: String,
    /// Absolute icon URL found in `<link rel="...icon...">`
    pub favicon_url: Option<String>,
}

pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap check whether this strategy applies to the page
    fn matches(&self, doc: &Document) -> bool;

    fn extract(&self, doc: &Document) -> Result<Extracted>;
}

/// Generic extractor: document title plus all visible body text
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor;

impl Extractor for DefaultExtractor {
    fn name(&self) -> &'static str {
        "default"
    }

    fn matches(&self, _doc: &Document) -> bool {
        true
    }

    fn extract(&self, doc: &Document) -> Result<Extracted> {
        let html = Html::parse_document(&doc.html);

        let text = html
            .select(&BODY)
            .next()
            .map(|body| visible_text(body, ""))
            .unwrap_or_default();
        if text.is_empty() {
            return Err(HisterError::ExtractionFailed("no text found".to_string()));
        }

        let title = document_title(&html);
        if title.is_empty() {
            return Err(HisterError::ExtractionFailed("no title found".to_string()));
        }

        Ok(Extracted {
            title,
            text,
            favicon_url: icon_link(&html, &doc.url),
        })
    }
}

/// Article extractor for pages with an `<article>` or `<main>` element.
///
/// Indexes only the main content, skipping navigation and footers, and
/// prefers the Open Graph title over `<title>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityExtractor;

impl Extractor for ReadabilityExtractor {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn matches(&self, doc: &Document) -> bool {
        let lower = doc.html.to_ascii_lowercase();
        lower.contains("<article") || lower.contains("<main")
    }

    fn extract(&self, doc: &Document) -> Result<Extracted> {
        let html = Html::parse_document(&doc.html);

        let content = html
            .select(&ARTICLE)
            .next()
            .or_else(|| html.select(&MAIN).next())
            .ok_or_else(|| HisterError::ExtractionFailed("no article element".to_string()))?;

        let text = visible_text(content, " ");
        if text.is_empty() {
            return Err(HisterError::ExtractionFailed(
                "no article text found".to_string(),
            ));
        }

        let title = html
            .select(&OG_TITLE)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| document_title(&html));
        if title.is_empty() {
            return Err(HisterError::ExtractionFailed("no title found".to_string()));
        }

        Ok(Extracted {
            title,
            text,
            favicon_url: icon_link(&html, &doc.url),
        })
    }
}

/// Text nodes under `root`, skipping script-like elements.
///
/// With an empty separator, text nodes are concatenated raw and the
/// whole is trimmed. Otherwise each node is trimmed and joined.
fn visible_text(root: ElementRef<'_>, separator: &str) -> String {
    let nodes = root.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let skipped = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        (!skipped).then_some(&**text)
    });

    if separator.is_empty() {
        nodes.collect::<String>().trim().to_string()
    } else {
        nodes
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn document_title(html: &Html) -> String {
    html.select(&TITLE)
        .flat_map(|t| t.text())
        .map(str::trim)
        .collect::<String>()
}

/// Last `<link rel="...icon..." href>` resolved against the page URL
fn icon_link(html: &Html, page_url: &str) -> Option<String> {
    html.select(&ICON_LINK)
        .filter(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_ascii_lowercase().contains("icon"))
        })
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .last()
        .and_then(|href| resolve(page_url, href.trim()))
}

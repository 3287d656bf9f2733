//! Index command - fetch pages and add them to the index

use crate::cli::output::{colors, format_duration, print_warning};
use crate::cli::OutputFormat;
use crate::core::indexer::favicon::USER_AGENT;
use crate::core::services::Services;
use crate::core::types::Document;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// URLs to index
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Read the page source from a file instead of fetching it (one URL only)
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Page title (extracted from the HTML when omitted)
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Outcome for one URL
#[derive(Debug, Serialize)]
pub struct IndexedItem {
    pub url: String,
    pub status: IndexStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Indexed,
    /// Rejected by a skip rule or the sensitive content screen
    Skipped,
    Failed,
}

/// Indexing result response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub indexed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_secs: f64,
    pub results: Vec<IndexedItem>,
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.html.is_some() && args.urls.len() > 1 {
        return Err("--html can only be used with a single URL.".into());
    }

    let start = Instant::now();
    let client = http_client(services)?;

    let mut results = Vec::with_capacity(args.urls.len());
    for url in &args.urls {
        if url.trim().is_empty() {
            print_warning("URL must not be empty");
            continue;
        }

        let html = match &args.html {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
            None => fetch_page(&client, url).await,
        };

        let item = match html {
            Ok(html) => {
                let mut doc = Document::new(url.as_str(), html);
                if let Some(title) = &args.title {
                    doc.title = title.clone();
                }
                index_one(services, url, doc).await
            }
            Err(e) => IndexedItem {
                url: url.clone(),
                status: IndexStatus::Failed,
                title: None,
                error: Some(e),
            },
        };

        if format == OutputFormat::Human && !args.quiet {
            print_item(&item);
        }
        results.push(item);
    }

    let count = |status| results.iter().filter(|r| r.status == status).count();
    let response = IndexResponse {
        indexed: count(IndexStatus::Indexed),
        skipped: count(IndexStatus::Skipped),
        failed: count(IndexStatus::Failed),
        duration_secs: start.elapsed().as_secs_f64(),
        results,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "\n{} {} page(s) in {}",
                colors::success("Indexed"),
                colors::number(&response.indexed.to_string()),
                format_duration(response.duration_secs)
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    if response.failed > 0 {
        return Err(format!("Failed to index {} URL(s)", response.failed).into());
    }
    Ok(())
}

/// Page fetching client with the configured timeout
pub(crate) fn http_client(services: &Services) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(services.config.indexing.fetch_timeout_secs))
        .user_agent(USER_AGENT)
        .build()
}

pub(crate) async fn index_one(services: &Services, url: &str, doc: Document) -> IndexedItem {
    match services.add_document(doc).await {
        Ok(stored) => IndexedItem {
            url: stored.url,
            status: IndexStatus::Indexed,
            title: Some(stored.title),
            error: None,
        },
        Err(e) => IndexedItem {
            url: url.to_string(),
            status: if e.is_policy_rejection() {
                IndexStatus::Skipped
            } else {
                IndexStatus::Failed
            },
            title: None,
            error: Some(e.to_string()),
        },
    }
}

/// GET the page source; a non-2xx answer or a non-HTML body is an error
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch {url}: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("Failed to fetch {url}: status {}", resp.status()));
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if !is_html(content_type) {
        return Err(format!(
            "Failed to fetch {url}: invalid content type '{}'",
            content_type.unwrap_or_default()
        ));
    }

    resp.text()
        .await
        .map_err(|e| format!("Failed to read {url}: {e}"))
}

/// `text/html`, `application/xhtml+xml` and the like; a missing header is not HTML
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("html"))
}

pub(crate) fn print_item(item: &IndexedItem) {
    match item.status {
        IndexStatus::Indexed => println!(
            "{} {} {}",
            colors::success("+"),
            colors::url(&item.url),
            colors::dim(item.title.as_deref().unwrap_or_default())
        ),
        IndexStatus::Skipped => println!(
            "{} {} {}",
            colors::warning("-"),
            colors::url(&item.url),
            colors::dim(item.error.as_deref().unwrap_or_default())
        ),
        IndexStatus::Failed => println!(
            "{} {} {}",
            colors::error("!"),
            colors::url(&item.url),
            item.error.as_deref().unwrap_or_default()
        ),
    }
}

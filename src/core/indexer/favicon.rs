//! Favicon download and embedding.
//!
//! Icons are stored inline as `data:` URIs so results render without
//! further requests. Resolution is best effort: a failure is logged and
//! the document is indexed without an icon.

use crate::core::error::{HisterError, Result};
use crate::core::indexer::url::resolve;
use crate::core::types::Document;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const USER_AGENT: &str = "Hister";

/// Fetches an icon URL and returns it as a `data:` URI
#[async_trait]
pub trait FaviconFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher used outside of tests
#[derive(Debug, Clone)]
pub struct HttpFaviconFetcher {
    client: Client,
}

impl HttpFaviconFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HisterError::FaviconFailed(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FaviconFetcher for HttpFaviconFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HisterError::FaviconFailed(format!("{url}: {e}")))?;

        if resp.status() != StatusCode::OK {
            return Err(HisterError::FaviconFailed(format!(
                "{url}: invalid status code {}",
                resp.status()
            )));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| HisterError::FaviconFailed(format!("{url}: {e}")))?;

        Ok(data_uri(&content_type, &bytes))
    }
}

pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Icon URL to try for `doc`: the discovered link, else `/favicon.ico`
pub fn candidate(doc: &Document) -> Option<String> {
    if !doc.favicon_url().is_empty() {
        return Some(doc.favicon_url().to_string());
    }
    resolve(&doc.url, "/favicon.ico")
}

/// Fill `doc.favicon` if it is empty. Never fails.
pub async fn resolve_favicon(doc: &mut Document, fetcher: &dyn FaviconFetcher) {
    if !doc.favicon.is_empty() {
        return;
    }
    let Some(url) = candidate(doc) else {
        return;
    };

    if url.starts_with("data:") {
        doc.favicon = url;
        return;
    }

    match fetcher.fetch(&url).await {
        Ok(favicon) => doc.favicon = favicon,
        Err(e) => tracing::warn!("Failed to download favicon {}: {}", url, e),
    }
}

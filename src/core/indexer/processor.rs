//! Document normalization pipeline.
//!
//! Every document passes through [`DocumentProcessor::process`] before
//! it is written: sensitive content screening, URL canonicalization,
//! timestamping and content extraction.

use crate::core::config::Config;
use crate::core::error::{HisterError, Result};
use crate::core::indexer::extractor::{DefaultExtractor, Extracted, Extractor, ReadabilityExtractor};
use crate::core::indexer::sensitive::SensitiveMatcher;
use crate::core::indexer::url::canonicalize;
use crate::core::types::Document;
use std::sync::Arc;

pub struct DocumentProcessor {
    extractors: Vec<Box<dyn Extractor>>,
    sensitive: Arc<SensitiveMatcher>,
}

impl DocumentProcessor {
    /// Create a processor with an explicit extractor chain
    pub fn new(extractors: Vec<Box<dyn Extractor>>, sensitive: Arc<SensitiveMatcher>) -> Self {
        Self {
            extractors,
            sensitive,
        }
    }

    /// Build the processor described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let sensitive = Arc::new(SensitiveMatcher::new(&config.sensitive_content_patterns)?);

        let mut extractors: Vec<Box<dyn Extractor>> = Vec::new();
        if config.indexing.readability {
            extractors.push(Box::new(ReadabilityExtractor));
        }
        extractors.push(Box::new(DefaultExtractor));

        tracing::debug!(
            "Document processor: {} extractors, {} sensitive patterns",
            extractors.len(),
            sensitive.len()
        );

        Ok(Self::new(extractors, sensitive))
    }

    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Normalize `doc` in place. Calling it again afterwards is a no-op.
    pub fn process(&self, doc: &mut Document) -> Result<()> {
        if doc.processed {
            return Ok(());
        }

        if !doc.skip_sensitive_check {
            self.sensitive.check(&doc.html)?;
        }

        let canonical = canonicalize(&doc.url)?;
        doc.url = canonical.url;
        doc.domain = canonical.domain;

        if doc.added == 0 {
            doc.added = chrono::Utc::now().timestamp();
        }

        if doc.title.is_empty() || doc.text.is_empty() {
            let extracted = self.extract(doc)?;
            if doc.title.is_empty() {
                doc.title = escape_html(&extracted.title);
            }
            if doc.text.is_empty() {
                doc.text = extracted.text;
            }
            if let Some(icon) = extracted.favicon_url {
                doc.favicon_url = icon;
            }
        }

        if doc.title.is_empty() {
            return Err(HisterError::MissingField("title".to_string()));
        }
        if doc.text.is_empty() {
            return Err(HisterError::MissingField("text".to_string()));
        }

        doc.processed = true;
        Ok(())
    }

    /// Reprocess a stored document, optionally bypassing the sensitive screen
    pub fn reprocess(&self, doc: &mut Document, skip_sensitive_check: bool) -> Result<()> {
        doc.processed = false;
        doc.skip_sensitive_check = skip_sensitive_check;
        self.process(doc)
    }

    /// First matching extractor that succeeds; otherwise the last failure
    fn extract(&self, doc: &Document) -> Result<Extracted> {
        let mut last_error = None;

        for extractor in self.extractors.iter().filter(|e| e.matches(doc)) {
            match extractor.extract(doc) {
                Ok(extracted) => return Ok(extracted),
                Err(e) => {
                    tracing::warn!(
                        "Extractor '{}' failed for {}: {}",
                        extractor.name(),
                        doc.url,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| HisterError::ExtractionFailed("no extractor found".to_string())))
    }
}

/// Escape `& < > " '` for safe embedding in HTML
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

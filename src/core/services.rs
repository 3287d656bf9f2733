//! Unified service container for Hister
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::error::{HisterError, Result};
use crate::core::indexer::{resolve_favicon, DocumentProcessor, FaviconFetcher, HttpFaviconFetcher};
use crate::core::rules::RulesStore;
use crate::core::search::SearchPlan;
use crate::core::storage::{self, IndexBackend, SearchPage, TantivyIndex};
use crate::core::types::{Document, HistoryEntry, Query, Results};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of recent-history entries merged into a first result page
pub const HISTORY_LIMIT: usize = 5;

/// Index engine façade: processing plus keyed storage
pub struct Indexer {
    backend: Arc<dyn IndexBackend>,
    processor: Arc<DocumentProcessor>,
}

impl Indexer {
    pub fn new(backend: Arc<dyn IndexBackend>, processor: Arc<DocumentProcessor>) -> Self {
        Self { backend, processor }
    }

    /// Open (or create) the Tantivy index at `path`
    pub fn open(path: &Path, processor: Arc<DocumentProcessor>) -> Result<Self> {
        let backend = TantivyIndex::open_or_create(path)?;
        tracing::debug!("Opened index at {:?}", path);
        Ok(Self::new(Arc::new(backend), processor))
    }

    /// Process `doc` if needed and upsert it. Returns the stored form.
    pub fn add(&self, mut doc: Document) -> Result<Document> {
        self.processor.process(&mut doc)?;
        self.backend.upsert(&doc)?;
        tracing::debug!("Indexed {}", doc.url);
        Ok(doc)
    }

    pub fn delete(&self, url: &str) -> Result<()> {
        self.backend.delete(url)
    }

    pub fn search(&self, plan: &SearchPlan) -> Result<SearchPage> {
        self.backend.search(plan)
    }

    pub fn get_by_url(&self, url: &str) -> Result<Option<Document>> {
        self.backend.get_by_url(url)
    }

    /// Visit every stored document; returns how many were visited
    pub fn iterate<F>(&self, visitor: F) -> Result<usize>
    where
        F: FnMut(Document) -> Result<()>,
    {
        storage::iterate(self.backend.as_ref(), visitor)
    }

    pub fn count(&self) -> Result<u64> {
        self.backend.count()
    }

    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }
}

/// Recent-history and suggestion lookups kept outside the index
pub trait HistoryStore: Send + Sync {
    /// Previously opened results for `query`, most used first
    fn recent(&self, query: &str, limit: usize) -> Result<Vec<HistoryEntry>>;

    /// A better query to offer the user, if any
    fn suggestion(&self, query: &str) -> Result<Option<String>>;
}

/// History store that knows nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryStore for NoHistory {
    fn recent(&self, _query: &str, _limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }

    fn suggestion(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Unified services container
///
/// All front ends use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Skip/priority rules and aliases
    pub rules: Arc<RulesStore>,

    pub indexer: Arc<Indexer>,

    pub processor: Arc<DocumentProcessor>,

    /// `None` when favicon fetching is disabled
    pub favicons: Option<Arc<dyn FaviconFetcher>>,

    pub history: Arc<dyn HistoryStore>,
}

impl Services {
    /// Create services from configuration, opening the index and rules
    pub fn new(config: Config) -> Result<Self> {
        let rules = RulesStore::load(config.rules_path())?;
        let processor = Arc::new(DocumentProcessor::from_config(&config)?);
        let indexer = Indexer::open(&config.index_path(), Arc::clone(&processor))?;

        let favicons: Option<Arc<dyn FaviconFetcher>> = if config.indexing.fetch_favicons {
            let timeout = Duration::from_secs(config.indexing.fetch_timeout_secs);
            Some(Arc::new(HttpFaviconFetcher::new(timeout)?))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            rules: Arc::new(rules),
            indexer: Arc::new(indexer),
            processor,
            favicons,
            history: Arc::new(NoHistory),
        })
    }

    /// Assemble services around an existing backend and rules store
    pub fn with_backend(
        config: Config,
        rules: RulesStore,
        backend: Arc<dyn IndexBackend>,
    ) -> Result<Self> {
        let processor = Arc::new(DocumentProcessor::from_config(&config)?);
        let indexer = Indexer::new(backend, Arc::clone(&processor));

        Ok(Self {
            config: Arc::new(config),
            rules: Arc::new(rules),
            indexer: Arc::new(indexer),
            processor,
            favicons: None,
            history: Arc::new(NoHistory),
        })
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_favicons(mut self, fetcher: Option<Arc<dyn FaviconFetcher>>) -> Self {
        self.favicons = fetcher;
        self
    }

    /// Run a search: alias resolution, compilation, execution, history merge
    pub fn search(&self, query: Query) -> Result<Results> {
        let start = Instant::now();
        let rules = self.rules.current();

        let mut resolved = query.clone();
        resolved.text = rules.resolve_aliases(&query.text);
        if resolved.text != query.text {
            tracing::debug!("Aliases expanded '{}' to '{}'", query.text, resolved.text);
        }

        let plan = SearchPlan::new(resolved, rules, &self.config.search)?;
        let page = self.indexer.search(&plan)?;

        let (history, query_suggestion) = if query.offset == 0 {
            self.history_for(&query.text)
        } else {
            (Vec::new(), String::new())
        };

        Ok(Results {
            total: page.total,
            query,
            documents: page.documents,
            history,
            search_duration: format_duration(start.elapsed()),
            query_suggestion,
        })
    }

    /// History lookups are best effort
    fn history_for(&self, text: &str) -> (Vec<HistoryEntry>, String) {
        let history = self.history.recent(text, HISTORY_LIMIT).unwrap_or_else(|e| {
            tracing::warn!("Failed to load history for '{}': {}", text, e);
            Vec::new()
        });
        let suggestion = match self.history.suggestion(text) {
            Ok(s) => s.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load suggestion for '{}': {}", text, e);
                String::new()
            }
        };
        (history, suggestion)
    }

    /// Process, screen against skip rules, embed the favicon and index
    pub async fn add_document(&self, mut doc: Document) -> Result<Document> {
        self.processor.process(&mut doc)?;

        if self.rules.current().is_skip(&doc.url) {
            return Err(HisterError::Skipped(doc.url));
        }

        if let Some(fetcher) = &self.favicons {
            resolve_favicon(&mut doc, fetcher.as_ref()).await;
        }

        self.indexer.add(doc)
    }
}

/// Milliseconds with two decimals, e.g. `1.52ms`
pub fn format_duration(elapsed: Duration) -> String {
    format!("{:.2}ms", elapsed.as_secs_f64() * 1000.0)
}

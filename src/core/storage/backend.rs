//! Narrow interface between the search core and the index engine.

use crate::core::error::Result;
use crate::core::search::SearchPlan;
use crate::core::types::Document;

/// Page size used when walking the whole corpus
pub const PAGE_SIZE: usize = 20;

/// One page of search hits
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Total number of matching documents
    pub total: u64,
    /// Hits in result order, with `score` set and `html` empty
    pub documents: Vec<Document>,
}

/// Storage operations needed by [`Indexer`](crate::core::services::Indexer)
/// and the reindexer.
///
/// Documents are keyed by URL. Writes are visible to readers once the
/// call returns.
pub trait IndexBackend: Send + Sync {
    /// Insert or replace the document with the same URL
    fn upsert(&self, doc: &Document) -> Result<()>;

    /// Remove the document with this URL; a missing URL is not an error
    fn delete(&self, url: &str) -> Result<()>;

    fn search(&self, plan: &SearchPlan) -> Result<SearchPage>;

    /// Full stored projection of the document with this URL
    fn get_by_url(&self, url: &str) -> Result<Option<Document>>;

    /// Stored documents `offset..offset + limit` in a stable order
    fn page(&self, offset: usize, limit: usize) -> Result<Vec<Document>>;

    fn count(&self) -> Result<u64>;
}

/// Walk every stored document in pages of [`PAGE_SIZE`].
///
/// Stops on the first empty page or visitor error. Returns the number of
/// documents visited.
pub fn iterate<B, F>(backend: &B, mut visitor: F) -> Result<usize>
where
    B: IndexBackend + ?Sized,
    F: FnMut(Document) -> Result<()>,
{
    let mut visited = 0;
    loop {
        let page = backend.page(visited, PAGE_SIZE)?;
        if page.is_empty() {
            return Ok(visited);
        }
        for doc in page {
            visited += 1;
            visitor(doc)?;
        }
    }
}

//! Tantivy integration for the history index.
//!
//! This module wraps Tantivy operations for creating, opening,
//! writing and searching the index, and turns a
//! [`CompiledQuery`] into Tantivy queries.

use crate::core::error::{HisterError, Result};
use crate::core::indexer::processor::escape_html;
use crate::core::rules::Rules;
use crate::core::search::scorer::{wildcard_to_regex, Rescorer, TitleMatcher};
use crate::core::search::{CompiledQuery, Field, SearchPlan};
use crate::core::storage::backend::{IndexBackend, SearchPage};
use crate::core::types::{Document, Highlight, SortOrder};
use parking_lot::{Mutex, MutexGuard};
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::columnar::StrColumn;
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, EmptyQuery, Occur, PhraseQuery, Query, QueryParser,
    RangeQuery, RegexQuery, TermQuery,
};
use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, FAST, INDEXED, STORED, TEXT,
};
use tantivy::snippet::{Snippet, SnippetGenerator};
use tantivy::tokenizer::{LowerCaser, RawTokenizer, TextAnalyzer, TokenStream};
use tantivy::{
    doc, DocAddress, DocId, Index, IndexReader, IndexWriter, Order, ReloadPolicy, Score,
    Searcher, SegmentReader, TantivyDocument, Term,
};

/// Tokenizer for URL-like fields: the whole value as one lower-cased term
pub const URL_TOKENIZER: &str = "url";

/// Exact-case canonical URL, the document key
const KEY_FIELD: &str = "key";
const TITLE_FIELD: &str = "title";

const WRITER_HEAP_BYTES: usize = 50_000_000;
const TITLE_SNIPPET_CHARS: usize = 1000;

/// Create the Tantivy schema for page indexing
///
/// Fields:
/// - key: exact canonical URL, one raw term | FAST
/// - url, domain: one lower-cased term per value (`url` tokenizer) | STORED
/// - title: full-text searchable (TEXT | STORED), raw value FAST for re-scoring
/// - text: full-text searchable (TEXT | STORED)
/// - favicon, html: STORED only
/// - added: Unix seconds (i64 | INDEXED | STORED | FAST)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    let key = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer("raw")
                .set_index_option(IndexRecordOption::Basic),
        )
        .set_fast(None);
    builder.add_text_field(KEY_FIELD, key);

    let keyword = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(URL_TOKENIZER)
                .set_index_option(IndexRecordOption::Basic),
        )
        .set_stored();
    builder.add_text_field("url", keyword.clone());
    builder.add_text_field("domain", keyword);

    builder.add_text_field(TITLE_FIELD, (TEXT | STORED).set_fast(None));
    builder.add_text_field("text", TEXT | STORED);

    builder.add_text_field("favicon", STORED);
    builder.add_text_field("html", STORED);

    builder.add_i64_field("added", INDEXED | STORED | FAST);

    builder.build()
}

/// Resolved schema fields
#[derive(Debug, Clone, Copy)]
struct Fields {
    key: tantivy::schema::Field,
    url: tantivy::schema::Field,
    domain: tantivy::schema::Field,
    title: tantivy::schema::Field,
    text: tantivy::schema::Field,
    favicon: tantivy::schema::Field,
    html: tantivy::schema::Field,
    added: tantivy::schema::Field,
}

impl Fields {
    fn new(schema: &Schema) -> Result<Self> {
        let get = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| HisterError::StorageError(format!("Missing {name} field: {e}")))
        };
        Ok(Self {
            key: get(KEY_FIELD)?,
            url: get("url")?,
            domain: get("domain")?,
            title: get(TITLE_FIELD)?,
            text: get("text")?,
            favicon: get("favicon")?,
            html: get("html")?,
            added: get("added")?,
        })
    }

    fn get(&self, field: Field) -> tantivy::schema::Field {
        match field {
            Field::Title => self.title,
            Field::Text => self.text,
            Field::Url => self.url,
            Field::Domain => self.domain,
        }
    }
}

/// Tantivy index wrapper
pub struct TantivyIndex {
    index: Index,
    fields: Fields,
    reader: IndexReader,

    /// `None` when opened read-only
    writer: Option<Mutex<IndexWriter>>,
}

impl std::fmt::Debug for TantivyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndex")
            .field("fields", &self.fields)
            .field("read_only", &self.writer.is_none())
            .finish()
    }
}

impl TantivyIndex {
    /// Whether an index exists at `index_dir`
    pub fn exists(index_dir: &Path) -> bool {
        index_dir.join("meta.json").exists()
    }

    /// Create a new Tantivy index at the given path
    pub fn create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let index = Index::create_in_dir(index_dir, create_schema())
            .map_err(|e| HisterError::StorageError(format!("Failed to create index: {e}")))?;

        tracing::debug!("Created index at {:?}", index_dir);
        Self::from_index(index, true)
    }

    /// Open an existing Tantivy index for reading and writing
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| HisterError::StorageError(format!("Failed to open index: {e}")))?;
        Self::from_index(index, true)
    }

    /// Open an existing index without taking the writer lock
    pub fn open_read_only(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| HisterError::StorageError(format!("Failed to open index: {e}")))?;
        Self::from_index(index, false)
    }

    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        if Self::exists(index_dir) {
            Self::open(index_dir)
        } else {
            Self::create(index_dir)
        }
    }

    fn from_index(index: Index, writable: bool) -> Result<Self> {
        index.tokenizers().register(
            URL_TOKENIZER,
            TextAnalyzer::builder(RawTokenizer::default())
                .filter(LowerCaser)
                .build(),
        );

        let fields = Fields::new(&index.schema())?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| HisterError::StorageError(format!("Failed to create reader: {e}")))?;

        let writer = if writable {
            let writer: IndexWriter = index
                .writer(WRITER_HEAP_BYTES)
                .map_err(|e| HisterError::StorageError(format!("Failed to create writer: {e}")))?;
            Some(Mutex::new(writer))
        } else {
            None
        };

        Ok(Self {
            index,
            fields,
            reader,
            writer,
        })
    }

    fn writer(&self) -> Result<MutexGuard<'_, IndexWriter>> {
        self.writer
            .as_ref()
            .map(|w| w.lock())
            .ok_or_else(|| HisterError::StorageError("Index is open read-only".to_string()))
    }

    /// Queue an upsert without committing
    pub fn stage(&self, doc: &Document) -> Result<()> {
        let writer = self.writer()?;
        writer.delete_term(self.key_term(&doc.url));
        writer
            .add_document(self.to_tantivy(doc))
            .map_err(|e| HisterError::StorageError(format!("Failed to add document: {e}")))?;
        Ok(())
    }

    /// Commit staged changes and make them visible to searches
    pub fn commit(&self) -> Result<()> {
        self.writer()?
            .commit()
            .map_err(|e| HisterError::StorageError(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| HisterError::StorageError(format!("Failed to reload reader: {e}")))
    }

    /// Release the writer, waiting for background merges
    pub fn close(self) -> Result<()> {
        if let Some(writer) = self.writer {
            writer
                .into_inner()
                .wait_merging_threads()
                .map_err(|e| HisterError::StorageError(format!("Failed to close writer: {e}")))?;
        }
        Ok(())
    }

    fn key_term(&self, url: &str) -> Term {
        Term::from_field_text(self.fields.key, url)
    }

    fn url_term(&self, url: &str) -> Term {
        Term::from_field_text(self.fields.url, &url.to_lowercase())
    }

    fn to_tantivy(&self, doc: &Document) -> TantivyDocument {
        let f = &self.fields;
        doc!(
            f.key => doc.url.as_str(),
            f.url => doc.url.as_str(),
            f.domain => doc.domain.as_str(),
            f.title => doc.title.as_str(),
            f.text => doc.text.as_str(),
            f.favicon => doc.favicon.as_str(),
            f.html => doc.html.as_str(),
            f.added => doc.added,
        )
    }

    fn to_document(&self, stored: &TantivyDocument) -> Document {
        let f = &self.fields;
        let text = |field| extract_text(stored, field);
        Document {
            url: text(f.url),
            domain: text(f.domain),
            title: text(f.title),
            text: text(f.text),
            favicon: text(f.favicon),
            html: text(f.html),
            added: stored.get_first(f.added).and_then(|v| v.as_i64()).unwrap_or(0),
            ..Default::default()
        }
    }

    fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    /// Convert an engine-independent query into a Tantivy query
    pub fn build_query(&self, query: &CompiledQuery) -> Result<Box<dyn Query>> {
        let built: Box<dyn Query> = match query {
            CompiledQuery::MatchNone => Box::new(EmptyQuery),
            CompiledQuery::MatchAll => Box::new(AllQuery),
            CompiledQuery::Fallback(raw) => self.parse_lenient(raw),
            CompiledQuery::Boolean { must, must_not } => {
                let mut clauses = Vec::with_capacity(must.len() + must_not.len());
                for q in must {
                    clauses.push((Occur::Must, self.build_query(q)?));
                }
                for q in must_not {
                    clauses.push((Occur::MustNot, self.build_query(q)?));
                }
                Box::new(BooleanQuery::new(clauses))
            }
            CompiledQuery::Any(queries) => {
                if queries.is_empty() {
                    return Ok(Box::new(EmptyQuery));
                }
                let clauses = queries
                    .iter()
                    .map(|q| Ok((Occur::Should, self.build_query(q)?)))
                    .collect::<Result<Vec<_>>>()?;
                Box::new(BooleanQuery::new(clauses))
            }
            CompiledQuery::Phrase { field, text, boost } => {
                boosted(self.phrase_query(*field, text)?, *boost)
            }
            CompiledQuery::Match { field, text, boost } => {
                boosted(self.match_query(*field, text)?, *boost)
            }
            CompiledQuery::Term {
                field,
                value,
                boost,
            } => boosted(
                Box::new(TermQuery::new(
                    Term::from_field_text(self.fields.get(*field), value),
                    record_option(*field),
                )),
                *boost,
            ),
            CompiledQuery::Wildcard {
                field,
                pattern,
                boost,
            } => {
                let regex = RegexQuery::from_pattern(
                    &wildcard_to_regex(pattern),
                    self.fields.get(*field),
                )
                .map_err(|e| {
                    HisterError::InvalidQuery(format!("Invalid wildcard '{pattern}': {e}"))
                })?;
                boosted(Box::new(regex), *boost)
            }
            CompiledQuery::AddedRange { from, to } => Box::new(RangeQuery::new_i64_bounds(
                "added".to_string(),
                from.map_or(Bound::Unbounded, Bound::Included),
                to.map_or(Bound::Unbounded, Bound::Included),
            )),
        };
        Ok(built)
    }

    fn parse_lenient(&self, raw: &str) -> Box<dyn Query> {
        let fields = Field::ALL.iter().map(|f| self.fields.get(*f)).collect();
        let mut parser = QueryParser::for_index(&self.index, fields);
        for field in Field::ALL {
            parser.set_field_boost(self.fields.get(field), field.weight());
        }

        let (query, errors) = parser.parse_query_lenient(raw);
        if !errors.is_empty() {
            tracing::debug!("Lenient parse of '{}' ignored {} errors", raw, errors.len());
        }
        query
    }

    /// Tokens of `text` as the field's analyzer produces them
    fn analyze(&self, field: Field, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self
            .index
            .tokenizer_for_field(self.fields.get(field))
            .map_err(|e| HisterError::SearchFailed(format!("Missing tokenizer: {e}")))?;

        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    fn match_query(&self, field: Field, text: &str) -> Result<Box<dyn Query>> {
        let schema_field = self.fields.get(field);
        let mut terms: Vec<Box<dyn Query>> = self
            .analyze(field, text)?
            .into_iter()
            .map(|token| {
                Box::new(TermQuery::new(
                    Term::from_field_text(schema_field, &token),
                    record_option(field),
                )) as Box<dyn Query>
            })
            .collect();

        Ok(match terms.len() {
            0 => Box::new(EmptyQuery),
            1 => terms.remove(0),
            _ => Box::new(BooleanQuery::union(terms)),
        })
    }

    fn phrase_query(&self, field: Field, text: &str) -> Result<Box<dyn Query>> {
        let schema_field = self.fields.get(field);
        let mut terms: Vec<Term> = self
            .analyze(field, text)?
            .iter()
            .map(|token| Term::from_field_text(schema_field, token))
            .collect();

        Ok(match terms.len() {
            0 => Box::new(EmptyQuery),
            1 => Box::new(TermQuery::new(terms.remove(0), record_option(field))),
            _ => Box::new(PhraseQuery::new(terms)),
        })
    }

    fn fetch(&self, searcher: &Searcher, addr: DocAddress) -> Result<TantivyDocument> {
        searcher
            .doc(addr)
            .map_err(|e| HisterError::SearchFailed(format!("Failed to retrieve document: {e}")))
    }

    /// Score-ordered hits with re-scoring applied inside the collector
    fn relevance_hits(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        plan: &SearchPlan,
    ) -> Result<(usize, Vec<(Score, DocAddress)>)> {
        let rules = Arc::clone(&plan.rules);
        let priority_boost = plan.priority_boost;
        let user_boost = plan.query.boost();
        let titles = TitleMatcher::new(&plan.compiled);

        let collector = TopDocs::with_limit(plan.limit)
            .and_offset(plan.query.offset)
            .tweak_score(move |segment_reader: &SegmentReader| {
                let columns = RescoreColumns::open(segment_reader);
                let rules = Arc::clone(&rules);
                let titles = titles.clone();

                move |doc: DocId, score: Score| {
                    score * user_boost * columns.multiplier(doc, &rules, priority_boost, &titles)
                }
            });

        searcher
            .search(query, &(Count, collector))
            .map_err(|e| HisterError::SearchFailed(format!("Search failed: {e}")))
    }

    /// Hits ordered by `added`, scored afterwards
    fn sorted_hits(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        plan: &SearchPlan,
        order: Order,
    ) -> Result<(usize, Vec<(Score, DocAddress)>)> {
        let collector = TopDocs::with_limit(plan.limit)
            .and_offset(plan.query.offset)
            .order_by_fast_field::<i64>("added", order);

        let (total, top) = searcher
            .search(query, &(Count, collector))
            .map_err(|e| HisterError::SearchFailed(format!("Search failed: {e}")))?;

        let titles = TitleMatcher::new(&plan.compiled);
        let mut hits = Vec::with_capacity(top.len());
        for (_, addr) in top {
            let base = query
                .explain(searcher, addr)
                .map(|e| e.value())
                .unwrap_or(0.0);
            let columns = RescoreColumns::open(searcher.segment_reader(addr.segment_ord));
            let multiplier =
                columns.multiplier(addr.doc_id, &plan.rules, plan.priority_boost, &titles);
            hits.push((base * plan.query.boost() * multiplier, addr));
        }

        Ok((total, hits))
    }
}

impl IndexBackend for TantivyIndex {
    fn upsert(&self, doc: &Document) -> Result<()> {
        self.stage(doc)?;
        self.commit()
    }

    fn delete(&self, url: &str) -> Result<()> {
        self.writer()?.delete_term(self.key_term(url));
        self.commit()
    }

    fn search(&self, plan: &SearchPlan) -> Result<SearchPage> {
        if plan.compiled == CompiledQuery::MatchNone {
            return Ok(SearchPage::default());
        }

        let searcher = self.searcher();
        let query = self.build_query(&plan.compiled)?;

        let (total, hits) = match plan.query.sort {
            SortOrder::Relevance => self.relevance_hits(&searcher, &*query, plan)?,
            SortOrder::Newest => self.sorted_hits(&searcher, &*query, plan, Order::Desc)?,
            SortOrder::Oldest => self.sorted_hits(&searcher, &*query, plan, Order::Asc)?,
        };

        let highlight = plan.query.highlight;
        let generators = match highlight.markers() {
            Some(_) => Some(self.snippet_generators(&searcher, &*query, plan)?),
            None => None,
        };

        let mut documents = Vec::with_capacity(hits.len());
        for (score, addr) in hits {
            let stored = self.fetch(&searcher, addr)?;
            let full = self.to_document(&stored);

            let mut doc = Document {
                url: full.url,
                title: full.title,
                favicon: full.favicon,
                added: full.added,
                score,
                ..Default::default()
            };

            match (&generators, highlight.markers()) {
                (Some((title_gen, text_gen)), Some(markers)) => {
                    let title = title_gen.snippet_from_doc(&stored);
                    if !title.is_empty() {
                        // Stored titles are already HTML-escaped
                        doc.title = render_snippet(&title, markers, false);
                    }
                    let text = text_gen.snippet_from_doc(&stored);
                    doc.text = if text.is_empty() {
                        preview(&full.text, plan.preview_chars, highlight)
                    } else {
                        render_snippet(&text, markers, highlight == Highlight::Html)
                    };
                }
                _ => doc.text = preview(&full.text, plan.preview_chars, highlight),
            }

            documents.push(doc);
        }

        Ok(SearchPage {
            total: total as u64,
            documents,
        })
    }

    /// Exact key first, then the case-insensitive `url` term
    fn get_by_url(&self, url: &str) -> Result<Option<Document>> {
        let searcher = self.searcher();

        for term in [self.key_term(url), self.url_term(url)] {
            let query = TermQuery::new(term, IndexRecordOption::Basic);
            let top = searcher
                .search(&query, &TopDocs::with_limit(1))
                .map_err(|e| HisterError::SearchFailed(format!("Search failed: {e}")))?;

            if let Some((_, addr)) = top.first() {
                return Ok(Some(self.to_document(&self.fetch(&searcher, *addr)?)));
            }
        }
        Ok(None)
    }

    fn page(&self, offset: usize, limit: usize) -> Result<Vec<Document>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let searcher = self.searcher();
        let top = searcher
            .search(&AllQuery, &TopDocs::with_limit(limit).and_offset(offset))
            .map_err(|e| HisterError::SearchFailed(format!("Search failed: {e}")))?;

        top.into_iter()
            .map(|(_, addr)| Ok(self.to_document(&self.fetch(&searcher, addr)?)))
            .collect()
    }

    fn count(&self) -> Result<u64> {
        Ok(self.searcher().num_docs())
    }
}

impl TantivyIndex {
    fn snippet_generators(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        plan: &SearchPlan,
    ) -> Result<(SnippetGenerator, SnippetGenerator)> {
        let create = |field| {
            SnippetGenerator::create(searcher, query, field)
                .map_err(|e| HisterError::SearchFailed(format!("Failed to create snippets: {e}")))
        };

        let mut title = create(self.fields.title)?;
        title.set_max_num_chars(TITLE_SNIPPET_CHARS);
        let mut text = create(self.fields.text)?;
        text.set_max_num_chars(plan.preview_chars.max(1));

        Ok((title, text))
    }
}

/// Per-segment fast columns read by the re-scorer.
///
/// Only the URL and title carry modifiers, so the stored document (and
/// its raw HTML) is never loaded while ranking candidates.
struct RescoreColumns {
    key: Option<StrColumn>,
    title: Option<StrColumn>,
}

impl RescoreColumns {
    fn open(segment_reader: &SegmentReader) -> Self {
        let column = |name: &str| match segment_reader.fast_fields().str(name) {
            Ok(column) => column,
            Err(e) => {
                tracing::warn!("Missing fast column '{}': {}", name, e);
                None
            }
        };
        Self {
            key: column(KEY_FIELD),
            title: column(TITLE_FIELD),
        }
    }

    /// Product of the per-field modifiers for one document
    fn multiplier(
        &self,
        doc: DocId,
        rules: &Rules,
        priority_boost: f32,
        titles: &TitleMatcher,
    ) -> f32 {
        let rescorer = Rescorer::new(rules, priority_boost);
        let mut visitor = rescorer.visitor();

        if let Some(url) = first_value(self.key.as_ref(), doc) {
            visitor.visit(Field::Url, &url, false);
        }
        if let Some(title) = first_value(self.title.as_ref(), doc) {
            visitor.visit(Field::Title, &title, titles.matches(&title));
        }

        visitor.multiplier()
    }
}

fn first_value(column: Option<&StrColumn>, doc: DocId) -> Option<String> {
    let column = column?;
    let ord = column.term_ords(doc).next()?;
    let mut value = String::new();
    match column.ord_to_str(ord, &mut value) {
        Ok(true) => Some(value),
        _ => None,
    }
}

fn boosted(query: Box<dyn Query>, boost: f32) -> Box<dyn Query> {
    if boost == 1.0 {
        query
    } else {
        Box::new(BoostQuery::new(query, boost))
    }
}

fn record_option(field: Field) -> IndexRecordOption {
    if field.is_keyword() {
        IndexRecordOption::Basic
    } else {
        IndexRecordOption::WithFreqs
    }
}

fn extract_text(doc: &TantivyDocument, field: tantivy::schema::Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Fragment with `open`/`close` around each highlighted range
fn render_snippet(snippet: &Snippet, (open, close): (&str, &str), escape: bool) -> String {
    let fragment = snippet.fragment();
    let push = |out: &mut String, s: &str| {
        if escape {
            out.push_str(&escape_html(s));
        } else {
            out.push_str(s);
        }
    };

    let mut out = String::with_capacity(fragment.len() + 16);
    let mut pos = 0;
    for range in snippet.highlighted() {
        if range.start < pos {
            continue;
        }
        push(&mut out, fragment.get(pos..range.start).unwrap_or_default());
        out.push_str(open);
        push(&mut out, fragment.get(range.clone()).unwrap_or_default());
        out.push_str(close);
        pos = range.end;
    }
    push(&mut out, fragment.get(pos..).unwrap_or_default());

    out
}

/// First `max_chars` characters of the stored text
fn preview(text: &str, max_chars: usize, highlight: Highlight) -> String {
    let truncated: String = text.chars().take(max_chars).collect();
    if highlight == Highlight::Html {
        escape_html(&truncated)
    } else {
        truncated
    }
}

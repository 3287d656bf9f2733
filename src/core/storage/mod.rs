//! Storage layer for the Tantivy-based history index.
//!
//! # Architecture
//!
//! - **IndexBackend**: the narrow interface the core writes and searches through
//! - **TantivyIndex**: Tantivy implementation (schema, query building, re-scoring)
//! - **reindex**: full rebuild into a scratch index with atomic swap
//!
//! # Index Layout
//!
//! ```text
//! {data_dir}/
//! ├── index.db/            # Tantivy index
//! │   ├── meta.json
//! │   └── [segment files]
//! └── rules.json           # skip/priority rules and aliases
//! ```
//!
//! During a reindex `tmp_index.db/` holds the rebuilt index and
//! `index.db.bak/` briefly holds the old one.

pub mod backend;
pub mod reindex;
mod tantivy;

pub use self::tantivy::{create_schema, TantivyIndex, URL_TOKENIZER};
pub use backend::{iterate, IndexBackend, SearchPage, PAGE_SIZE};
pub use reindex::reindex;

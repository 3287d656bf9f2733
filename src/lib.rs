//! Hister - web history on steroids
//!
//! A personal search engine over visited pages. Pages are normalized,
//! text-extracted and stored in a Tantivy full-text index; searches use
//! a small query language and are re-ranked by user priority rules.
//!
//! # Architecture
//!
//! The codebase is organized into two main modules:
//!
//! - **core**: Domain logic (front-end agnostic)
//!   - config, error, types, xdg, rules
//!   - search (query language, compiler, re-scoring)
//!   - indexer (screening, URL canonicalization, extraction, favicons)
//!   - storage (Tantivy index, reindexing)
//!   - services (index façade and service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Query Language
//!
//! ```text
//! rust async          both words, in any field
//! "async runtime"     phrase in title or text
//! (tokio|smol)        either option
//! -java               exclude pages matching java
//! url:*docs* title:x  field-scoped terms, `*` wildcards
//! ```

// Core domain logic (front-end agnostic)
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::error::{HisterError, Result};
pub use crate::core::services::{Indexer, Services};
pub use crate::core::types::*;

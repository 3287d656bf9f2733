//! Core domain logic (front-end agnostic)
//!
//! This module contains all search and indexing logic that is
//! independent of the web server, TUI or CLI calling it.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Documents, queries and results
//! - **xdg**: XDG directory handling
//! - **rules**: Skip/priority rules and query aliases
//! - **search**: Query language, compilation and re-scoring
//! - **indexer**: Document processing (screening, URLs, extraction, favicons)
//! - **storage**: Tantivy index and reindexing
//! - **services**: Index façade and unified service container

pub mod config;
pub mod error;
pub mod indexer;
pub mod rules;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{HisterError, Result};
pub use services::{Indexer, Services};

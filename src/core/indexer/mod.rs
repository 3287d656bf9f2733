//! Document processing before indexing.
//!
//! Turns a submitted page (URL + raw HTML) into an indexable
//! [`Document`](crate::core::types::Document):
//!
//! - Sensitive content screening (credentials, private keys)
//! - URL canonicalization (no fragment, no `utm_*` tracking parameters)
//! - Title/text extraction through an ordered chain of strategies
//! - Best-effort favicon embedding
//!
//! # Safety
//!
//! HTML is parsed with an HTML5 tree builder that never panics on
//! malformed markup, and all text handling is `char` based so
//! multi-byte content is safe.

pub mod extractor;
pub mod favicon;
pub mod processor;
pub mod sensitive;
pub mod url;

pub use extractor::{DefaultExtractor, Extracted, Extractor, ReadabilityExtractor};
pub use favicon::{resolve_favicon, FaviconFetcher, HttpFaviconFetcher};
pub use processor::DocumentProcessor;
pub use sensitive::SensitiveMatcher;

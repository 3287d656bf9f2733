//! Indexer layer tests
//!
//! Document processing through the public service API, including
//! multi-byte and malformed input.

mod test_multibyte;
mod test_processing;

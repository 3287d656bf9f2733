//! CLI test helpers
//!
//! Provides utilities for testing CLI commands including:
//! - Arc<Services> wrappers matching CLI execute() signatures
//! - Page source files for `index --html`

use crate::common::{add_pages, test_config, TestPage};
use hister::core::services::Services;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Create test services wrapped in Arc (matching CLI execute() signatures)
pub fn create_cli_test_services() -> (Arc<Services>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let services =
        Services::new(test_config(temp_dir.path())).expect("Failed to create services");
    (Arc::new(services), temp_dir)
}

/// Services with `pages` already indexed
pub async fn create_indexed_services(pages: &[TestPage]) -> (Arc<Services>, TempDir) {
    let (services, temp) = create_cli_test_services();
    add_pages(&services, pages).await;
    (services, temp)
}

/// Write `html` to a file inside `dir`
pub fn write_page(dir: &TempDir, name: &str, html: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, html).expect("Failed to write page");
    path
}

// Test helper functions

use super::fixtures::TestPage;
use hister::core::config::Config;
use hister::core::services::Services;
use hister::core::types::Document;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Config rooted at `data_dir` with network access disabled
#[allow(dead_code)] // Used in integration tests
pub fn test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.app.data_dir = data_dir.to_path_buf();
    config.indexing.fetch_favicons = false;
    config
}

/// Create test services with temporary storage
///
/// Keep the returned TempDir alive for the duration of the test.
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services() -> (Arc<Services>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let services =
        Services::new(test_config(temp_dir.path())).expect("Failed to create services");
    (Arc::new(services), temp_dir)
}

/// Add every page through the full processing path
#[allow(dead_code)] // Used in integration tests
pub async fn add_pages(services: &Services, pages: &[TestPage]) -> Vec<Document> {
    let mut stored = Vec::with_capacity(pages.len());
    for page in pages {
        let doc = services
            .add_document(Document::new(page.url, page.html()))
            .await
            .unwrap_or_else(|e| panic!("Failed to add {}: {e}", page.url));
        stored.push(doc);
    }
    stored
}

// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
// Note: These may appear unused in some test binaries
#[allow(unused_imports)]
pub use fixtures::{page_html, TestPage, CORPUS};
#[allow(unused_imports)]
pub use helpers::{add_pages, create_test_services, test_config};

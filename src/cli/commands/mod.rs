//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod completions;
pub mod config;
pub mod delete;
pub mod import;
pub mod index;
pub mod list;
pub mod reindex;
pub mod rules;
pub mod search;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::{ConfigArgs, CreateConfigArgs};
pub use delete::DeleteArgs;
pub use import::ImportArgs;
pub use index::IndexArgs;
pub use list::ListArgs;
pub use reindex::ReindexArgs;
pub use rules::RulesCommand;
pub use search::SearchArgs;

//! Reindex command - rebuild the index with the current rules

use crate::cli::output::{colors, format_duration};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::indexer::DocumentProcessor;
use crate::core::rules::RulesStore;
use crate::core::storage::reindex;
use clap::Args;
use std::io::Write;

/// Arguments for the reindex command
#[derive(Args, Debug)]
pub struct ReindexArgs {
    /// Drop documents that match a sensitive content pattern
    #[arg(long, short = 'x')]
    pub exclude_sensitive: bool,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Execute the reindex command
///
/// The index must not be open elsewhere (stop the server first).
pub fn execute(
    args: ReindexArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let processor = DocumentProcessor::from_config(config)?;
    let rules = RulesStore::load(config.rules_path())?.current();
    let show_progress = format == OutputFormat::Human && !args.quiet;

    let stats = reindex(
        &config.index_path(),
        &config.scratch_index_path(),
        &processor,
        &rules,
        !args.exclude_sensitive,
        |progress| {
            if show_progress {
                eprint!(
                    "\rReindexing: {} visited, {} written",
                    progress.visited, progress.written
                );
                std::io::stderr().flush()?;
            }
            Ok(())
        },
    )?;

    match format {
        OutputFormat::Human => {
            if show_progress {
                eprintln!();
            }
            println!(
                "{} {} of {} documents in {}",
                colors::success("Reindexed"),
                colors::number(&stats.written.to_string()),
                colors::number(&stats.visited.to_string()),
                format_duration(stats.duration_ms as f64 / 1000.0)
            );
            if stats.skipped_rules > 0 {
                println!("  dropped by skip rules: {}", stats.skipped_rules);
            }
            if stats.skipped_sensitive > 0 {
                println!("  dropped as sensitive: {}", stats.skipped_sensitive);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

//! List command - print every indexed URL

use crate::cli::output::{colors, format_relative_time};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the list-urls command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also print titles and when each page was added
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// One listed page
#[derive(Debug, Serialize)]
pub struct ListedUrl {
    pub url: String,
    pub title: String,
    pub added: i64,
}

/// Execute the list-urls command
pub async fn execute(
    args: ListArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pages = Vec::new();
    services.indexer.iterate(|doc| {
        match format {
            // Stream human output so large indexes print progressively
            OutputFormat::Human if args.verbose => println!(
                "{} {} {}",
                colors::url(&doc.url),
                colors::title(&doc.title),
                colors::dim(&format_relative_time(doc.added))
            ),
            OutputFormat::Human => println!("{}", doc.url),
            OutputFormat::Json => pages.push(ListedUrl {
                url: doc.url,
                title: doc.title,
                added: doc.added,
            }),
        }
        Ok(())
    })?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
    }

    Ok(())
}

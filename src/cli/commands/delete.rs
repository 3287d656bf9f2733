//! Delete command - remove pages from the index

use crate::cli::output::{colors, print_warning};
use crate::cli::OutputFormat;
use crate::core::indexer::url::canonicalize;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// URLs to remove
    #[arg(required = true)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: Vec<String>,
}

/// Key under which `url` would have been stored
fn index_key(url: &str) -> String {
    canonicalize(url)
        .map(|c| c.url)
        .unwrap_or_else(|_| url.to_string())
}

/// Execute the delete command
pub async fn execute(
    args: DeleteArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut deleted = Vec::with_capacity(args.urls.len());

    for url in &args.urls {
        if url.trim().is_empty() {
            print_warning("URL must not be empty");
            continue;
        }
        let key = index_key(url);
        services.indexer.delete(&key)?;
        deleted.push(key);
    }

    match format {
        OutputFormat::Human => {
            for url in &deleted {
                println!("{} {}", colors::success("Deleted"), colors::url(url));
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&DeleteResponse { deleted })?
            );
        }
    }

    Ok(())
}

//! Import command - index the pages found in a browser history database

use crate::cli::commands::index::{
    fetch_page, http_client, index_one, print_item, IndexStatus, IndexedItem,
};
use crate::cli::output::{colors, format_duration};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::Document;
use clap::{Args, ValueEnum};
use serde::Serialize;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Browser whose history database is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Browser {
    Firefox,
    Chrome,
}

impl Browser {
    fn table(self) -> &'static str {
        match self {
            Browser::Firefox => "moz_places",
            Browser::Chrome => "urls",
        }
    }
}

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Browser the database belongs to
    pub browser: Browser,

    /// Path to the history database (places.sqlite for Firefox, History for Chrome)
    pub db_path: PathBuf,

    /// Only import URLs visited at least this many times
    #[arg(long, default_value_t = 1)]
    pub min_visit: i64,

    /// Suppress per-URL output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Import result response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub found: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_secs: f64,
    pub results: Vec<IndexedItem>,
}

/// Distinct URLs from the history database, most visited first.
///
/// The database is opened read-only and immutable, so a browser holding
/// a lock on it does not block the import.
pub async fn read_history(
    browser: Browser,
    db_path: &Path,
    min_visit: i64,
) -> Result<Vec<String>, sqlx::Error> {
    let mut conn = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .immutable(true)
        .connect()
        .await?;

    let mut sql = format!("SELECT url FROM {} WHERE url != ''", browser.table());
    if min_visit > 1 {
        sql.push_str(" AND visit_count >= ?1");
    }
    sql.push_str(" GROUP BY url ORDER BY MAX(visit_count) DESC, url");

    let mut query = sqlx::query_scalar::<_, String>(&sql);
    if min_visit > 1 {
        query = query.bind(min_visit);
    }
    let urls = query.fetch_all(&mut conn).await?;

    conn.close().await?;
    Ok(urls)
}

/// Execute the import command
pub async fn execute(
    args: ImportArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.db_path.is_file() {
        return Err(format!("Database not found: {}", args.db_path.display()).into());
    }

    let start = Instant::now();
    let urls = read_history(args.browser, &args.db_path, args.min_visit)
        .await
        .map_err(|e| format!("Failed to read {}: {}", args.db_path.display(), e))?;

    if urls.is_empty() {
        return Err("No URLs found".into());
    }
    tracing::info!("Importing {} URL(s) from {:?}", urls.len(), args.db_path);

    let client = http_client(services)?;
    let verbose = format == OutputFormat::Human && !args.quiet;

    let mut results = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        if verbose {
            println!(
                "{} {}",
                colors::dim(&format!("[{}/{}]", i + 1, urls.len())),
                colors::url(url)
            );
        }

        let item = match fetch_page(&client, url).await {
            Ok(html) => index_one(services, url, Document::new(url.as_str(), html)).await,
            Err(e) => IndexedItem {
                url: url.clone(),
                status: IndexStatus::Failed,
                title: None,
                error: Some(e),
            },
        };

        if item.status == IndexStatus::Failed {
            tracing::warn!(
                "Failed to index {}: {}",
                url,
                item.error.as_deref().unwrap_or_default()
            );
        }
        if verbose {
            print_item(&item);
        }
        results.push(item);
    }

    let count = |status| results.iter().filter(|r| r.status == status).count();
    let response = ImportResponse {
        found: urls.len(),
        imported: count(IndexStatus::Indexed),
        skipped: count(IndexStatus::Skipped),
        failed: count(IndexStatus::Failed),
        duration_secs: start.elapsed().as_secs_f64(),
        results,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "\n{} {} of {} URL(s) in {} ({} skipped, {} failed)",
                colors::success("Imported"),
                colors::number(&response.imported.to_string()),
                colors::number(&response.found.to_string()),
                format_duration(response.duration_secs),
                response.skipped,
                response.failed
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

//! Search command - query the history index

use crate::cli::output::{colors, format_relative_time, truncate_chars};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::{Highlight, Query, SortOrder};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, ValueEnum};
use std::sync::Arc;

const PREVIEW_CHARS: usize = 200;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms (joined with spaces); options must come first
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub terms: Vec<String>,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Number of results to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Result order
    #[arg(long, value_enum, default_value = "relevance")]
    pub sort: SortArg,

    /// Restrict to fields (title, text, url, domain), comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Only pages added on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only pages added on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Only show URLs
    #[arg(long)]
    pub urls_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Relevance,
    Newest,
    Oldest,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Relevance => SortOrder::Relevance,
            SortArg::Newest => SortOrder::Newest,
            SortArg::Oldest => SortOrder::Oldest,
        }
    }
}

/// Unix timestamp of `day` at `time` (UTC)
fn parse_day(day: &str, time: NaiveTime) -> Result<i64, String> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|d| d.and_time(time).and_utc().timestamp())
        .map_err(|e| format!("Invalid date '{day}' (expected YYYY-MM-DD): {e}"))
}

/// Build the search request described by `args`
pub fn build_query(args: &SearchArgs, format: OutputFormat) -> Result<Query, String> {
    let mut query = Query::new(args.terms.join(" "));
    query.limit = args.limit;
    query.offset = args.offset;
    query.sort = args.sort.into();
    query.fields = args.fields.iter().map(|f| f.trim().to_string()).collect();
    query.highlight = match format {
        OutputFormat::Human => Highlight::Text,
        OutputFormat::Json => Highlight::None,
    };

    if let Some(from) = &args.from {
        query.date_from = Some(parse_day(from, NaiveTime::MIN)?);
    }
    if let Some(to) = &args.to {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        query.date_to = Some(parse_day(to, end_of_day)?);
    }

    Ok(query)
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = build_query(&args, format)?;
    let results = services.search(query)?;

    match format {
        OutputFormat::Human => {
            if results.documents.is_empty() {
                println!(
                    "No results found for '{}'",
                    colors::label(&results.query.text)
                );
                return Ok(());
            }

            println!(
                "Found {} result(s) in {}:\n",
                colors::number(&results.total.to_string()),
                results.search_duration
            );

            for (i, doc) in results.documents.iter().enumerate() {
                if args.urls_only {
                    println!("{}", colors::url(&doc.url));
                    continue;
                }

                println!(
                    "[{}] {} {}",
                    colors::rank(&(args.offset + i + 1).to_string()),
                    colors::title(&doc.title),
                    colors::dim(&format!(
                        "(score: {:.2}, added {})",
                        doc.score,
                        format_relative_time(doc.added)
                    ))
                );
                println!("    {}", colors::url(&doc.url));
                let preview = doc.text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !preview.is_empty() {
                    println!("    {}", truncate_chars(&preview, PREVIEW_CHARS));
                }
                println!();
            }

            if !results.query_suggestion.is_empty() {
                println!(
                    "Did you mean: {}",
                    colors::label(&results.query_suggestion)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

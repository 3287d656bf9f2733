//! Hister CLI - command-line interface to the web history index
//!
//! # Examples
//!
//! ```bash
//! # Index a page
//! hister index https://tokio.rs/
//!
//! # Search, newest first
//! hister search --sort newest "async runtime" -java
//!
//! # Import pages visited at least 3 times in Firefox
//! hister import firefox ~/.mozilla/firefox/abc.default/places.sqlite --min-visit 3
//!
//! # Prefer documentation sites
//! hister rules set-priority 'docs\.rs' 'doc\.rust-lang\.org'
//!
//! # Rebuild after changing skip rules
//! hister reindex
//! ```

use clap::Parser;
use hister::cli::output::print_error;
use hister::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

//! CLI adapter for Hister
//!
//! Provides a command-line interface to the history index: adding and
//! removing pages, searching, rule editing and maintenance.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!                       v
//!              +------------------+
//!              |      cli/        |
//!              | (clap adapter)   |
//!              +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Hister - web history on steroids
///
/// Full-text search over the pages you have visited. Index pages,
/// search them with a small query language and tune ranking with
/// priority rules.
#[derive(Parser, Debug)]
#[command(name = "hister")]
#[command(version)]
#[command(about = "Web history search engine", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, short = 'l', global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index one or more URLs
    Index(commands::IndexArgs),

    /// Index the pages from a Firefox or Chrome history database
    Import(commands::ImportArgs),

    /// Search the index
    Search(commands::SearchArgs),

    /// Remove pages from the index
    Delete(commands::DeleteArgs),

    /// List indexed URLs
    #[command(name = "list-urls")]
    ListUrls(commands::ListArgs),

    /// Rebuild the index with the current rules (stop the server first)
    Reindex(commands::ReindexArgs),

    /// Show or edit skip/priority rules and aliases
    #[command(subcommand)]
    Rules(commands::RulesCommand),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Write the default configuration to a file
    #[command(name = "create-config")]
    CreateConfig(commands::CreateConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  hister completions bash > ~/.local/share/bash-completion/completions/hister
    ///   zsh:   hister completions zsh > ~/.zfunc/_hister
    ///   fish:  hister completions fish > ~/.config/fish/completions/hister.fish
    Completions(commands::CompletionsArgs),
}

/// Initialize stderr logging.
///
/// `HISTER_LOG` takes an `EnvFilter` directive and wins over `level`.
pub fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("HISTER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("hister={level}")));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Debug trace of where state lives and what was loaded
fn log_startup(xdg: &crate::core::xdg::XdgDirs, config: &crate::core::config::Config) {
    xdg.log_paths();
    config.log_config();
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle commands that need neither config nor index
    match cli.command {
        Commands::Completions(args) => return commands::completions::execute(args),
        Commands::CreateConfig(args) => {
            return commands::config::execute_create(args, cli.format)
        }
        _ => {}
    }

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    // Load configuration
    let mut config = Config::load()?;
    if let Some(level) = cli.log_level {
        config.app.log_level = level;
    }
    init_tracing(&config.app.log_level);
    log_startup(&xdg, &config);

    // Commands that must not hold the index open
    let config = match cli.command {
        Commands::ShowConfig(args) => {
            return commands::config::execute_show(args, &config, cli.format)
        }
        Commands::Reindex(args) => {
            return commands::reindex::execute(args, &config, cli.format)
        }
        Commands::Rules(command) => {
            return commands::rules::execute(command, &config, cli.format)
        }
        _ => config,
    };

    std::fs::create_dir_all(&config.app.data_dir)?;

    // Create services
    let services = Arc::new(Services::new(config)?);

    // Execute command
    match cli.command {
        Commands::Index(args) => commands::index::execute(args, &services, cli.format).await,
        Commands::Import(args) => commands::import::execute(args, &services, cli.format).await,
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::Delete(args) => commands::delete::execute(args, &services, cli.format).await,
        Commands::ListUrls(args) => commands::list::execute(args, &services, cli.format).await,
        Commands::ShowConfig(_)
        | Commands::CreateConfig(_)
        | Commands::Reindex(_)
        | Commands::Rules(_)
        | Commands::Completions(_) => unreachable!(), // Handled above
    }
}

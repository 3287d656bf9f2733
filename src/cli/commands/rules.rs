//! Rules commands - inspect and edit skip/priority rules and aliases

use crate::cli::output::{colors, print_header, print_output, print_success};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::rules::{Rules, RulesStore};
use clap::Subcommand;

/// Rule editing subcommands
#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Show the active rules
    Show,

    /// Add or replace a query alias
    #[command(name = "add-alias")]
    AddAlias {
        /// Single word that is replaced in queries
        keyword: String,
        /// Replacement query text
        value: String,
    },

    /// Remove a query alias
    #[command(name = "delete-alias")]
    DeleteAlias { keyword: String },

    /// Replace the skip patterns (URLs matching any are never indexed)
    #[command(name = "set-skip")]
    SetSkip { patterns: Vec<String> },

    /// Replace the priority patterns (matching URLs rank higher)
    #[command(name = "set-priority")]
    SetPriority { patterns: Vec<String> },
}

/// Execute a rules subcommand
pub fn execute(
    command: RulesCommand,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = RulesStore::load(config.rules_path())?;

    let (rules, message) = match command {
        RulesCommand::Show => (store.current(), None),
        RulesCommand::AddAlias { keyword, value } => {
            let rules = store.add_alias(&keyword, &value)?;
            (rules, Some(format!("Alias '{keyword}' saved")))
        }
        RulesCommand::DeleteAlias { keyword } => {
            let rules = store.delete_alias(&keyword)?;
            (rules, Some(format!("Alias '{keyword}' deleted")))
        }
        RulesCommand::SetSkip { patterns } => {
            let rules = store.set_skip(patterns)?;
            (rules, Some("Skip rules saved".to_string()))
        }
        RulesCommand::SetPriority { patterns } => {
            let rules = store.set_priority(patterns)?;
            (rules, Some("Priority rules saved".to_string()))
        }
    };

    match format {
        OutputFormat::Human => {
            if let Some(message) = message {
                print_success(&message);
                println!();
            }
            print_rules(&rules);
        }
        OutputFormat::Json => print_output(&rules.to_data(), format),
    }

    Ok(())
}

fn print_rules(rules: &Rules) {
    let data = rules.to_data();

    print_header("Skip:");
    for pattern in &data.skip {
        println!("  {pattern}");
    }

    print_header("Priority:");
    for pattern in &data.priority {
        println!("  {pattern}");
    }

    print_header("Aliases:");
    for (keyword, value) in &data.aliases {
        println!("  {} {} {}", colors::label(keyword), colors::dim("=>"), value);
    }
}

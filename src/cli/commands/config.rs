//! Config commands - show and create configuration files

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also print derived paths (index, rules)
    #[arg(long, short = 'p')]
    pub paths: bool,
}

/// Arguments for the create-config command
#[derive(Args, Debug)]
pub struct CreateConfigArgs {
    /// Target file (defaults to the XDG config file)
    pub filename: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct ShowConfigResponse<'a> {
    #[serde(flatten)]
    config: &'a Config,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<Paths>,
}

#[derive(Debug, Serialize)]
struct Paths {
    index: PathBuf,
    rules: PathBuf,
}

/// Execute the show-config command
pub fn execute_show(
    args: ConfigArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = args.paths.then(|| Paths {
        index: config.index_path(),
        rules: config.rules_path(),
    });

    match format {
        OutputFormat::Human => {
            print!("{}", config.to_toml()?);
            if let Some(paths) = paths {
                println!();
                println!("# {}", colors::label("Derived paths"));
                println!("# index: {}", paths.index.display());
                println!("# rules: {}", paths.rules.display());
            }
        }
        OutputFormat::Json => {
            let response = ShowConfigResponse { config, paths };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// Execute the create-config command
pub fn execute_create(
    args: CreateConfigArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args
        .filename
        .unwrap_or_else(|| XdgDirs::new().config_file());

    if path.exists() && !args.force {
        return Err(format!(
            "Config file '{}' already exists. Use --force to overwrite.",
            path.display()
        )
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::default().to_toml()?)?;

    match format {
        OutputFormat::Human => {
            println!("{} {}", colors::success("Created"), path.display());
        }
        OutputFormat::Json => {
            let response = serde_json::json!({ "created": path });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

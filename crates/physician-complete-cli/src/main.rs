use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use physician_complete::WidgetConfig;
use std::path::{Path, PathBuf};

mod search;
mod tui;

#[derive(Parser)]
#[command(name = "physician-complete")]
#[command(about = "Physician name autocomplete against the NPI directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Write log output to this file instead of stderr
    #[arg(long = "log-file", global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// TOML file with widget settings
    #[arg(long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URI of the directory search API
    #[arg(long = "api-url", global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Restrict results to practice ZIP codes starting with this prefix
    #[arg(long = "zip", global = true, value_name = "ZIP")]
    zip: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive autocomplete in the terminal (default)
    Tui,

    /// Run one search and print the results
    #[command(alias = "s")]
    Search(search::SearchArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so it only logs to stderr when asked to
    let quiet_default = matches!(command, Commands::Tui) && cli.log_file.is_none();
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else if quiet_default {
        Env::default().default_filter_or("off")
    } else {
        Env::default().default_filter_or("error")
    };
    let mut logger = env_logger::Builder::from_env(env);
    if let Some(path) = &cli.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    logger.init();

    let config = resolve_config(
        cli.config.as_deref(),
        |key| std::env::var(key).ok(),
        cli.api_url.as_deref(),
        cli.zip.as_deref(),
    )?;
    log::debug!("using {config:?}");

    match command {
        Commands::Tui => tui::run(config),
        Commands::Search(args) => search::execute(args, config),
    }
}

/// Defaults, then the config file, then the environment, then flags
fn resolve_config(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
    api_url: Option<&str>,
    zip: Option<&str>,
) -> anyhow::Result<WidgetConfig> {
    let mut config = match path {
        Some(path) => WidgetConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => WidgetConfig::default(),
    }
    .with_env_lookup(env);

    if let Some(url) = api_url {
        config = config.with_api_base_uri(url);
    }
    if let Some(zip) = zip {
        config = config.with_zip_code(zip);
    }
    config.validate().context("Invalid widget configuration")?;
    Ok(config)
}

//! trendcast CLI
//!
//! Collects social media trends into CSV tables and serves trend-aware
//! hashtag, content and question answering over HTTP.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{CollectCommand, PollCommand, SearchCommand, ServeCommand};
use std::path::PathBuf;
use tracing::Instrument;
use trendcast_core::{config::AppConfig, logging};

/// trendcast - social trend collection and trend-aware content generation
#[derive(Parser, Debug)]
#[command(name = "trendcast")]
#[command(about = "Social trend collection and trend-aware content generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "TRENDCAST_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.trendcast/config.yaml)
    #[arg(short, long, global = true, env = "TRENDCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the CSV tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP answering service
    Serve(ServeCommand),

    /// Run the collectors once
    Collect(CollectCommand),

    /// Run the collectors on a schedule
    Poll(PollCommand),

    /// Query the relevance index from the command line
    Search(SearchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A workspace .env supplies GEMINI_API_KEY without exporting it
    let env_file = cli
        .workspace
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".env");
    if let Err(e) = dotenvy::from_path(&env_file) {
        if !e.not_found() {
            eprintln!("Warning: failed to load {:?}: {}", env_file, e);
        }
    }

    let config = AppConfig::load(cli.workspace, cli.config)
        .context("Failed to load configuration")?
        .with_overrides(cli.data_dir, cli.log_level, cli.verbose, cli.no_color);

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("trendcast starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Data dir: {:?}", config.data_dir);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Collect(_) => "collect",
        Commands::Poll(_) => "poll",
        Commands::Search(_) => "search",
    };
    let span = tracing::info_span!("command", name = command_name);

    let result = async {
        match cli.command {
            Commands::Serve(cmd) => cmd.execute(&config).await,
            Commands::Collect(cmd) => cmd.execute(&config).await,
            Commands::Poll(cmd) => cmd.execute(&config).await,
            Commands::Search(cmd) => cmd.execute(&config).await,
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}

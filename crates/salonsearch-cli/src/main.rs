mod db;
mod index;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{db::DbCommands, index::IndexCommands, search::SearchArgs};

#[derive(Debug, Parser)]
#[command(name = "salonsearch-cli")]
#[command(about = "Salon search operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Search index maintenance
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
    /// Run one search and print the response as JSON
    Search(SearchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("salonsearch-cli: run with --help to list commands");
        return Ok(());
    };

    let config = salonsearch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so `search` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Db { command } => db::run(&config, command).await,
        Commands::Index { command } => index::run(&config, command).await,
        Commands::Search(args) => search::run(&config, args).await,
    }
}

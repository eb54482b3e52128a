//! `index` subcommands.

use clap::Subcommand;
use salonsearch_core::AppConfig;

use crate::search::build_service;

#[derive(Debug, Subcommand)]
pub enum IndexCommands {
    /// Replace the search index with every active salon from Postgres
    Sync,
    /// Print cluster health and index statistics
    Health,
    /// Delete the search index
    Drop {
        /// Required; dropping the index empties document search until the next sync
        #[arg(long)]
        yes: bool,
    },
}

pub(crate) async fn run(config: &AppConfig, command: IndexCommands) -> anyhow::Result<()> {
    match command {
        IndexCommands::Sync => {
            let service = build_service(config)?;
            let indexed = service.reindex().await?;
            println!("indexed {indexed} salon(s) into '{}'", config.index_name);
        }
        IndexCommands::Health => {
            let service = build_service(config)?;
            let report = service.health().await;
            let health = service.cluster_health().await?;
            let stats = service.index_stats().await.ok();
            let out = serde_json::json!({
                "postgres": report.postgres,
                "elasticsearch": report.elasticsearch,
                "cluster": health,
                "index_stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        IndexCommands::Drop { yes } => {
            if !yes {
                anyhow::bail!("refusing to drop '{}' without --yes", config.index_name);
            }
            let client = salonsearch_index::IndexClient::new(
                &config.elasticsearch_url,
                &config.index_name,
                config.index_request_timeout_secs,
            )?;
            client.delete_index().await?;
            println!("dropped index '{}'", config.index_name);
        }
    }
    Ok(())
}

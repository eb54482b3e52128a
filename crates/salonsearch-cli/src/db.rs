//! `db` subcommands.

use clap::Subcommand;
use salonsearch_core::AppConfig;
use salonsearch_db::PoolConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that Postgres answers
    Ping,
    /// Apply pending migrations
    Migrate,
}

pub(crate) async fn run(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool =
        salonsearch_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
            .await?;

    match command {
        DbCommands::Ping => {
            salonsearch_db::ping(&pool).await?;
            println!("postgres: ok");
        }
        DbCommands::Migrate => {
            let applied = salonsearch_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }

    pool.close().await;
    Ok(())
}

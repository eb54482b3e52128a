mod api;
mod middleware;

use std::time::Duration;

use salonsearch_index::IndexClient;
use salonsearch_search::SearchService;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = salonsearch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Lazy so the server can boot, and report degraded health, while
    // Postgres is still coming up.
    let pool_config = salonsearch_db::PoolConfig::from_app_config(&config);
    let pool = salonsearch_db::connect_pool_lazy(&config.database_url, pool_config)?;
    match salonsearch_db::run_migrations(&pool).await {
        Ok(applied) => tracing::info!(applied, "migrations up to date"),
        Err(e) => tracing::warn!(error = %e, "could not run migrations at startup"),
    }

    let index = IndexClient::new(
        &config.elasticsearch_url,
        &config.index_name,
        config.index_request_timeout_secs,
    )?;
    match index.ensure_index().await {
        Ok(true) => tracing::info!(index = %index.index(), "created search index"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "could not ensure search index at startup"),
    }

    let service = SearchService::new(
        pool,
        index,
        Duration::from_secs(config.query_timeout_secs),
    );

    let auth = AuthState::from_env(matches!(
        config.env,
        salonsearch_core::Environment::Development
    ))?;
    let app = build_app(AppState { service }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "salonsearch server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

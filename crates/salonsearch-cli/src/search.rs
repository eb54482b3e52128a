//! `search` subcommand: one query against either backend, printed as JSON.

use std::time::Duration;

use clap::Args;
use salonsearch_core::{AppConfig, Backend, SearchParameters, SearchRequest};
use salonsearch_db::PoolConfig;
use salonsearch_index::IndexClient;
use salonsearch_search::SearchService;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query
    #[arg(long, short)]
    pub q: Option<String>,
    /// City, matched case-insensitively
    #[arg(long)]
    pub city: Option<String>,
    /// Category id
    #[arg(long)]
    pub category: Option<i64>,
    /// Price tier 1-4
    #[arg(long)]
    pub price_range: Option<i16>,
    #[arg(long)]
    pub min_rating: Option<f64>,
    /// Only verified salons
    #[arg(long)]
    pub verified: bool,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
    /// Radius in kilometres around --lat/--lon
    #[arg(long)]
    pub radius: Option<f64>,
    /// relevance, rating, reviews, distance or newest
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long)]
    pub page: Option<i64>,
    #[arg(long)]
    pub page_size: Option<i64>,
    /// postgres or elasticsearch
    #[arg(long, default_value = "elasticsearch")]
    pub backend: Backend,
}

impl From<SearchArgs> for SearchRequest {
    fn from(args: SearchArgs) -> Self {
        SearchRequest {
            q: args.q,
            city: args.city,
            category: args.category,
            price_range: args.price_range,
            min_rating: args.min_rating,
            verified: args.verified.then_some(true),
            lat: args.lat,
            lon: args.lon,
            radius: args.radius,
            sort: args.sort,
            page: args.page,
            page_size: args.page_size,
        }
    }
}

/// Lazy pool so commands that only touch the index do not need Postgres.
pub(crate) fn build_service(config: &AppConfig) -> anyhow::Result<SearchService> {
    let pool = salonsearch_db::connect_pool_lazy(
        &config.database_url,
        PoolConfig::from_app_config(config),
    )?;
    let index = IndexClient::new(
        &config.elasticsearch_url,
        &config.index_name,
        config.index_request_timeout_secs,
    )?;
    Ok(SearchService::new(
        pool,
        index,
        Duration::from_secs(config.query_timeout_secs),
    ))
}

pub(crate) async fn run(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let backend = args.backend;
    let params = SearchParameters::try_from(SearchRequest::from(args))?;
    let service = build_service(config)?;

    let response = service.search(&params, backend).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

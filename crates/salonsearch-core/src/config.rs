use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        match raw.parse::<u64>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            Ok(v) => Ok(v),
            Err(e) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SALONSEARCH_ENV", "development"));
    let bind_addr = parse_addr("SALONSEARCH_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("SALONSEARCH_LOG_LEVEL", "info");

    let elasticsearch_url = or_default("ELASTICSEARCH_URL", "http://localhost:9200");
    let index_name = or_default("SALONSEARCH_INDEX_NAME", "salons");
    if index_name.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SALONSEARCH_INDEX_NAME".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let db_max_connections = parse_u32("SALONSEARCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SALONSEARCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_secs("SALONSEARCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let index_request_timeout_secs = parse_secs("SALONSEARCH_INDEX_REQUEST_TIMEOUT_SECS", "30")?;
    let query_timeout_secs = parse_secs("SALONSEARCH_QUERY_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        elasticsearch_url,
        index_name,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        index_request_timeout_secs,
        query_timeout_secs,
    })
}

/// Case-insensitive; anything unrecognised is development.
fn parse_environment(s: &str) -> Environment {
    match s.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

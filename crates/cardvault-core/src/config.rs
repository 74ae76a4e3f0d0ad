use crate::app_config::AppConfig;
use crate::cards::PriceKind;
use crate::ConfigError;

const DEFAULT_PRICING_BASE_URL: &str = "https://www.pricecharting.com/api";
const DEFAULT_USER_AGENT: &str = "cardvault/0.1 (price-reconciliation)";

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
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let log_level = or_default("CARDVAULT_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CARDVAULT_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("CARDVAULT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CARDVAULT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "CARDVAULT_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    let pricing_api_token = lookup("PRICING_API_TOKEN").ok().filter(|t| !t.is_empty());
    let pricing_base_url = or_default("CARDVAULT_PRICING_BASE_URL", DEFAULT_PRICING_BASE_URL);
    let price_source = or_default("CARDVAULT_PRICE_SOURCE", "pricecharting");
    let price_kinds = parse_price_kinds(&or_default("CARDVAULT_PRICE_KINDS", "loose"))?;

    let request_timeout_secs = parse_u64("CARDVAULT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CARDVAULT_USER_AGENT", DEFAULT_USER_AGENT);
    let max_attempts = parse_u32("CARDVAULT_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CARDVAULT_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_backoff_base_secs = parse_u64("CARDVAULT_RETRY_BACKOFF_BASE_SECS", "2")?;
    let catalog_delay_ms = parse_u64("CARDVAULT_CATALOG_DELAY_MS", "0")?;
    let collection_delay_ms = parse_u64("CARDVAULT_COLLECTION_DELAY_MS", "1000")?;
    let excluded_series = split_list(&or_default(
        "CARDVAULT_EXCLUDED_SERIES",
        "Autograph,Printing Plate",
    ));

    Ok(AppConfig {
        database_url,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        pricing_api_token,
        pricing_base_url,
        price_source,
        price_kinds,
        request_timeout_secs,
        user_agent,
        max_attempts,
        retry_backoff_base_secs,
        catalog_delay_ms,
        collection_delay_ms,
        excluded_series,
    })
}

/// Parse a comma-separated list of price kinds, keeping first occurrence order.
fn parse_price_kinds(raw: &str) -> Result<Vec<PriceKind>, ConfigError> {
    let mut kinds = Vec::new();
    for name in split_list(raw) {
        let kind = PriceKind::parse(&name).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "CARDVAULT_PRICE_KINDS".to_string(),
            reason: format!("unknown price kind '{name}'"),
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "CARDVAULT_PRICE_KINDS".to_string(),
            reason: "at least one price kind is required".to_string(),
        });
    }
    Ok(kinds)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::cards::PriceKind;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Static query token sent as `t=` on every pricing API request.
    pub pricing_api_token: Option<String>,
    pub pricing_base_url: String,
    /// `price_sources.name` the reconciler reads and writes under.
    pub price_source: String,
    /// Price tiers to persist, in the order they are written.
    pub price_kinds: Vec<PriceKind>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Total attempts per remote call, including the first.
    pub max_attempts: u32,
    pub retry_backoff_base_secs: u64,
    pub catalog_delay_ms: u64,
    pub collection_delay_ms: u64,
    /// Case-insensitive series-name fragments excluded from catalog sweeps.
    pub excluded_series: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "pricing_api_token",
                &self.pricing_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("pricing_base_url", &self.pricing_base_url)
            .field("price_source", &self.price_source)
            .field("price_kinds", &self.price_kinds)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("catalog_delay_ms", &self.catalog_delay_ms)
            .field("collection_delay_ms", &self.collection_delay_ms)
            .field("excluded_series", &self.excluded_series)
            .finish()
    }
}

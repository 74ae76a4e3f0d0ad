//! Postgres access for the price reconciler.
//!
//! Catalog tables are read-only here. The only writes are the two upserts in
//! [`pricing`], each a single statement keyed on its unique constraint.

pub mod candidates;
pub mod pool;
pub mod pricing;

use thiserror::Error;

pub use candidates::{list_catalog_candidates, list_collection_candidates, CandidateRow, Mapped};
pub use pool::{connect_pool, ping, run_migrations, PoolConfig};
pub use pricing::{
    cents_to_decimal, get_card_price, get_external_id, resolve_price_source_id,
    resolve_price_type_id, upsert_card_price, upsert_external_id, CardPriceRow, ExternalIdRow,
};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("unknown price source '{0}'")]
    UnknownPriceSource(String),
    #[error("unknown price type '{0}'")]
    UnknownPriceType(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

//! Database operations for `price_sources`, `price_types`,
//! `card_external_id`, and `card_price`.
//!
//! Both writes are single-statement upserts on their composite unique keys,
//! so re-running a reconcile pass overwrites rather than duplicates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `card_external_id` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExternalIdRow {
    pub id: i64,
    pub card_id: i64,
    pub price_source_id: i64,
    pub external_id: String,
    /// Remote display name at match time, kept for auditing matches.
    pub external_name: Option<String>,
    pub match_method: String,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `card_price` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CardPriceRow {
    pub id: i64,
    pub card_id: i64,
    pub price_type_id: i64,
    pub price_source_id: i64,
    /// `NULL` when the source reported no price.
    pub price: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Resolves a `price_sources.name` to its id.
///
/// # Errors
///
/// Returns [`DbError::UnknownPriceSource`] if no row has that name, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn resolve_price_source_id(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM price_sources WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::UnknownPriceSource(name.to_string()))
}

/// Resolves a `price_types.name` to its id.
///
/// # Errors
///
/// Returns [`DbError::UnknownPriceType`] if no row has that name, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn resolve_price_type_id(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM price_types WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::UnknownPriceType(name.to_string()))
}

/// Returns the mapping for `(card_id, price_source_id)`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_external_id(
    pool: &PgPool,
    card_id: i64,
    price_source_id: i64,
) -> Result<Option<ExternalIdRow>, DbError> {
    let row = sqlx::query_as::<_, ExternalIdRow>(
        "SELECT id, card_id, price_source_id, external_id, external_name, match_method, \
                updated_at \
         FROM card_external_id \
         WHERE card_id = $1 AND price_source_id = $2",
    )
    .bind(card_id)
    .bind(price_source_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the price observation for the composite key, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_card_price(
    pool: &PgPool,
    card_id: i64,
    price_type_id: i64,
    price_source_id: i64,
) -> Result<Option<CardPriceRow>, DbError> {
    let row = sqlx::query_as::<_, CardPriceRow>(
        "SELECT id, card_id, price_type_id, price_source_id, price, last_updated \
         FROM card_price \
         WHERE card_id = $1 AND price_type_id = $2 AND price_source_id = $3",
    )
    .bind(card_id)
    .bind(price_type_id)
    .bind(price_source_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Upserts
// ---------------------------------------------------------------------------

/// Upserts the mapping from a local card to a remote product.
///
/// Conflicts on `(card_id, price_source_id)` replace `external_id`,
/// `external_name`, `match_method`, and bump `updated_at`.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_external_id(
    pool: &PgPool,
    card_id: i64,
    price_source_id: i64,
    external_id: &str,
    external_name: &str,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO card_external_id \
             (card_id, price_source_id, external_id, external_name, match_method) \
         VALUES ($1, $2, $3, $4, 'auto') \
         ON CONFLICT (card_id, price_source_id) DO UPDATE SET \
             external_id   = EXCLUDED.external_id, \
             external_name = EXCLUDED.external_name, \
             match_method  = EXCLUDED.match_method, \
             updated_at    = NOW() \
         RETURNING id",
    )
    .bind(card_id)
    .bind(price_source_id)
    .bind(external_id)
    .bind(external_name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Upserts one price observation, converting integer cents to currency units.
///
/// Conflicts on `(card_id, price_type_id, price_source_id)` overwrite `price`
/// and `last_updated`. `None` persists as `NULL`, never as zero.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_card_price(
    pool: &PgPool,
    card_id: i64,
    price_type_id: i64,
    price_source_id: i64,
    price_cents: Option<i64>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO card_price (card_id, price_type_id, price_source_id, price) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (card_id, price_type_id, price_source_id) DO UPDATE SET \
             price        = EXCLUDED.price, \
             last_updated = NOW() \
         RETURNING id",
    )
    .bind(card_id)
    .bind(price_type_id)
    .bind(price_source_id)
    .bind(cents_to_decimal(price_cents))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Converts integer cents to a two-place decimal. `None` stays `None`.
#[must_use]
pub fn cents_to_decimal(cents: Option<i64>) -> Option<Decimal> {
    cents.map(|c| Decimal::new(c, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_convert_to_two_place_decimal() {
        assert_eq!(cents_to_decimal(Some(4599)), Some(Decimal::new(4599, 2)));
        assert_eq!(
            cents_to_decimal(Some(4599)).map(|d| d.to_string()),
            Some("45.99".to_string())
        );
    }

    #[test]
    fn zero_cents_is_zero_not_null() {
        assert_eq!(cents_to_decimal(Some(0)), Some(Decimal::ZERO));
    }

    #[test]
    fn missing_cents_stay_null() {
        assert_eq!(cents_to_decimal(None), None);
    }
}

//! Persistence seam for the reconcile strategies.
//!
//! Strategies only see [`ReconcileStore`]; production runs use [`PgStore`],
//! which carries the price-source and price-type ids resolved at startup.

use cardvault_core::{AppConfig, LocalCard, PriceKind, Target};
use cardvault_db::{DbError, Mapped};
use cardvault_pricing::RemoteProduct;
use sqlx::PgPool;

/// Candidate reads and result writes for a single price source.
pub(crate) trait ReconcileStore {
    async fn candidates(
        &self,
        target: Target,
        mapped: Mapped,
        limit: Option<i64>,
    ) -> Result<Vec<LocalCard>, DbError>;

    async fn upsert_mapping(
        &self,
        card_id: i64,
        remote_id: &str,
        remote_name: &str,
    ) -> Result<(), DbError>;

    async fn upsert_price(
        &self,
        card_id: i64,
        kind: PriceKind,
        price_cents: Option<i64>,
    ) -> Result<(), DbError>;
}

pub(crate) struct PgStore {
    pool: PgPool,
    price_source_id: i64,
    price_type_ids: Vec<(PriceKind, i64)>,
    excluded_series: Vec<String>,
}

impl PgStore {
    /// Resolves the configured source and every configured price kind.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownPriceSource`] or [`DbError::UnknownPriceType`]
    /// when a name has no row, or [`DbError::Sqlx`] if a lookup fails.
    pub(crate) async fn resolve(pool: PgPool, config: &AppConfig) -> Result<Self, DbError> {
        let price_source_id =
            cardvault_db::resolve_price_source_id(&pool, &config.price_source).await?;

        let mut price_type_ids = Vec::with_capacity(config.price_kinds.len());
        for &kind in &config.price_kinds {
            let id = cardvault_db::resolve_price_type_id(&pool, kind.type_name()).await?;
            price_type_ids.push((kind, id));
        }

        tracing::debug!(
            price_source = %config.price_source,
            price_source_id,
            kinds = price_type_ids.len(),
            "resolved pricing identifiers"
        );

        Ok(Self {
            pool,
            price_source_id,
            price_type_ids,
            excluded_series: config.excluded_series.clone(),
        })
    }

    fn price_type_id(&self, kind: PriceKind) -> Result<i64, DbError> {
        self.price_type_ids
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .ok_or_else(|| DbError::UnknownPriceType(kind.type_name().to_owned()))
    }
}

impl ReconcileStore for PgStore {
    async fn candidates(
        &self,
        target: Target,
        mapped: Mapped,
        limit: Option<i64>,
    ) -> Result<Vec<LocalCard>, DbError> {
        match target {
            Target::Catalog => {
                cardvault_db::list_catalog_candidates(
                    &self.pool,
                    self.price_source_id,
                    mapped,
                    &self.excluded_series,
                    limit,
                )
                .await
            }
            Target::Collection => {
                cardvault_db::list_collection_candidates(
                    &self.pool,
                    self.price_source_id,
                    mapped,
                    limit,
                )
                .await
            }
        }
    }

    async fn upsert_mapping(
        &self,
        card_id: i64,
        remote_id: &str,
        remote_name: &str,
    ) -> Result<(), DbError> {
        cardvault_db::upsert_external_id(
            &self.pool,
            card_id,
            self.price_source_id,
            remote_id,
            remote_name,
        )
        .await?;
        Ok(())
    }

    async fn upsert_price(
        &self,
        card_id: i64,
        kind: PriceKind,
        price_cents: Option<i64>,
    ) -> Result<(), DbError> {
        let price_type_id = self.price_type_id(kind)?;
        cardvault_db::upsert_card_price(
            &self.pool,
            card_id,
            price_type_id,
            self.price_source_id,
            price_cents,
        )
        .await?;
        Ok(())
    }
}

/// Writes one observation per tracked kind the product reports a price for.
///
/// Absent prices are skipped so an unknown price never overwrites a known
/// one. Returns the number of observations written, or that would have been
/// written when `dry_run` is set.
pub(crate) async fn write_prices<S: ReconcileStore>(
    store: &S,
    card_id: i64,
    product: &RemoteProduct,
    kinds: &[PriceKind],
    dry_run: bool,
) -> Result<u64, DbError> {
    let mut written = 0;
    for &kind in kinds {
        let Some(cents) = product.price_cents(kind) else {
            continue;
        };
        if !dry_run {
            store.upsert_price(card_id, kind, Some(cents)).await?;
        }
        written += 1;
    }
    Ok(written)
}

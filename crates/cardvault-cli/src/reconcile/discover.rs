//! Discovery: search the remote API for each unmapped card and persist the
//! first qualifying candidate as its mapping.

use std::time::Instant;

use anyhow::Context;
use cardvault_core::{LocalCard, PriceKind};
use cardvault_pricing::{find_match, PricingClient};

use super::stats::{CardOutcome, PhaseStats};
use super::store::{write_prices, ReconcileStore};

/// Processes `cards` in order. A failing card is counted and logged; the
/// loop always moves on to the next one.
pub(crate) async fn run_discovery<S: ReconcileStore>(
    store: &S,
    client: &PricingClient,
    cards: &[LocalCard],
    kinds: &[PriceKind],
    dry_run: bool,
) -> PhaseStats {
    let started = Instant::now();
    let retries_before = client.retry_count();
    let mut stats = PhaseStats::default();

    for card in cards {
        let outcome = match discover_card(store, client, card, kinds, dry_run).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(card_id = card.id, error = %format!("{e:#}"), "card discovery failed");
                CardOutcome::Errored
            }
        };
        stats.record(outcome);
    }

    stats.retried = client.retry_count().saturating_sub(retries_before);
    stats.duration = started.elapsed();
    tracing::info!(
        processed = stats.processed,
        matched = stats.matched,
        no_match = stats.no_match(),
        errors = stats.errors,
        skipped = stats.skipped,
        "match phase finished"
    );
    stats
}

async fn discover_card<S: ReconcileStore>(
    store: &S,
    client: &PricingClient,
    card: &LocalCard,
    kinds: &[PriceKind],
    dry_run: bool,
) -> anyhow::Result<CardOutcome> {
    let Some(query) = card.search_query() else {
        tracing::debug!(card_id = card.id, "no players linked, skipping");
        return Ok(CardOutcome::Skipped);
    };

    let products = client
        .search(&query)
        .await
        .with_context(|| format!("search for \"{query}\" failed"))?;

    let set_display_name = card.set_display_name();
    let product = match find_match(card, &products, &set_display_name) {
        Ok(product) => product,
        Err(reason) => {
            tracing::info!(
                card_id = card.id,
                query = %query,
                candidates = products.len(),
                reason = reason.as_str(),
                "no match"
            );
            return Ok(CardOutcome::Unmatched(reason));
        }
    };

    tracing::info!(
        card_id = card.id,
        remote_id = %product.id,
        remote_name = %product.product_name,
        "matched"
    );

    if !dry_run {
        store
            .upsert_mapping(card.id, &product.id, &product.product_name)
            .await
            .context("failed to persist mapping")?;
    }
    let prices_written = write_prices(store, card.id, product, kinds, dry_run)
        .await
        .context("failed to persist price")?;

    Ok(CardOutcome::Persisted { prices_written })
}

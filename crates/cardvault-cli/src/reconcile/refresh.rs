//! Refresh: re-fetch already-mapped cards by remote id and overwrite their
//! stored prices. Mappings are never touched here.

use std::time::Instant;

use anyhow::Context;
use cardvault_core::{LocalCard, PriceKind};
use cardvault_pricing::PricingClient;

use super::stats::{CardOutcome, PhaseStats};
use super::store::{write_prices, ReconcileStore};

pub(crate) async fn run_refresh<S: ReconcileStore>(
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
        let outcome = match refresh_card(store, client, card, kinds, dry_run).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // The previously stored price stays as it was.
                tracing::warn!(card_id = card.id, error = %format!("{e:#}"), "card refresh failed");
                CardOutcome::Errored
            }
        };
        stats.record(outcome);
    }

    stats.retried = client.retry_count().saturating_sub(retries_before);
    stats.duration = started.elapsed();
    tracing::info!(
        processed = stats.processed,
        found = stats.matched,
        price_written = stats.price_written,
        errors = stats.errors,
        "refresh phase finished"
    );
    stats
}

async fn refresh_card<S: ReconcileStore>(
    store: &S,
    client: &PricingClient,
    card: &LocalCard,
    kinds: &[PriceKind],
    dry_run: bool,
) -> anyhow::Result<CardOutcome> {
    let Some(remote_id) = card.external_id.as_deref() else {
        return Ok(CardOutcome::Skipped);
    };

    let product = client
        .fetch_by_id(remote_id)
        .await
        .with_context(|| format!("lookup of remote id {remote_id} failed"))?;

    let prices_written = write_prices(store, card.id, &product, kinds, dry_run)
        .await
        .context("failed to persist price")?;
    tracing::debug!(card_id = card.id, remote_id, prices_written, "refreshed");

    Ok(CardOutcome::Persisted { prices_written })
}

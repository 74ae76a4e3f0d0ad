//! `reconcile` command: links local cards to remote pricing products and
//! keeps their stored prices current.
//!
//! Cards are processed strictly one at a time. Per-card failures are logged
//! and counted, never propagated; only setup failures (missing token,
//! unresolvable price source or type, unreachable store) abort the run.

mod discover;
mod refresh;
mod stats;
mod store;

use std::time::{Duration, Instant};

use anyhow::Context;
use cardvault_core::{AppConfig, Mode, PriceKind, Target};
use cardvault_db::Mapped;
use cardvault_pricing::{ClientOptions, PricingClient};
use clap::{Args, ValueEnum};
use tracing::Instrument;
use uuid::Uuid;

use self::stats::{Phase, RunStats};
use self::store::{PgStore, ReconcileStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TargetArg {
    /// Every catalog card outside the excluded series, in catalog order
    Catalog,
    /// Cards in at least one active collection, most-owned first
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Re-fetch prices for cards that already have a mapping
    Refresh,
    /// Search for and map cards that have none
    Match,
    /// Refresh, then match
    Both,
}

/// Arguments for `cardvault reconcile`.
#[derive(Debug, Args)]
pub(crate) struct ReconcileArgs {
    /// Which cards to consider
    #[arg(long, value_enum, default_value_t = TargetArg::Catalog)]
    pub target: TargetArg,

    /// Which strategies to run
    #[arg(long, value_enum, default_value_t = ModeArg::Both)]
    pub mode: ModeArg,

    /// Process at most N cards per phase
    #[arg(long)]
    pub limit: Option<u32>,

    /// Run searches and matching but write nothing to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured delay before each API call, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

/// Validated settings for one reconcile run.
#[derive(Debug, Clone)]
pub(crate) struct ReconcileOptions {
    pub target: Target,
    pub mode: Mode,
    pub limit: Option<u32>,
    pub dry_run: bool,
    /// Slept before every remote call attempt.
    pub delay: Duration,
}

impl ReconcileArgs {
    /// Resolves the CLI flags against config defaults. The inter-call delay
    /// falls back to the per-target value when `--delay-ms` is absent.
    pub(crate) fn into_options(self, config: &AppConfig) -> ReconcileOptions {
        let target = match self.target {
            TargetArg::Catalog => Target::Catalog,
            TargetArg::Collection => Target::Collection,
        };
        let mode = match self.mode {
            ModeArg::Refresh => Mode::Refresh,
            ModeArg::Match => Mode::Match,
            ModeArg::Both => Mode::Both,
        };
        let default_delay_ms = match target {
            Target::Catalog => config.catalog_delay_ms,
            Target::Collection => config.collection_delay_ms,
        };

        ReconcileOptions {
            target,
            mode,
            limit: self.limit,
            dry_run: self.dry_run,
            delay: Duration::from_millis(self.delay_ms.unwrap_or(default_delay_ms)),
        }
    }
}

/// Runs one reconcile pass against Postgres and prints the summary.
///
/// # Errors
///
/// Returns an error if the API token is missing, the configured price source
/// or price types do not exist, the pricing client cannot be built, or
/// candidate selection fails.
pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    options: &ReconcileOptions,
) -> anyhow::Result<()> {
    let token = config
        .pricing_api_token
        .as_deref()
        .context("PRICING_API_TOKEN must be set to run reconcile")?;

    let store = PgStore::resolve(pool.clone(), config)
        .await
        .with_context(|| {
            format!(
                "failed to resolve price source '{}' and its price types",
                config.price_source
            )
        })?;

    let client = build_pricing_client(config, token, options.delay)?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "reconcile",
        %run_id,
        target = %options.target,
        mode = %options.mode,
        dry_run = options.dry_run,
    );
    let stats = run_phases(&store, &client, &config.price_kinds, options, run_id)
        .instrument(span)
        .await?;

    println!("{stats}");
    Ok(())
}

fn build_pricing_client(
    config: &AppConfig,
    token: &str,
    delay: Duration,
) -> anyhow::Result<PricingClient> {
    let options = ClientOptions {
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_attempts: config.max_attempts,
        backoff_base_secs: config.retry_backoff_base_secs,
        inter_call_delay: delay,
    };
    PricingClient::with_base_url(token, &config.pricing_base_url, &options)
        .context("failed to build pricing client")
}

/// Drives the selected phases in order: refresh first, then discovery, so
/// cards mapped during this run are not fetched twice.
///
/// # Errors
///
/// Returns an error only when candidate selection fails.
pub(crate) async fn run_phases<S: ReconcileStore>(
    store: &S,
    client: &PricingClient,
    kinds: &[PriceKind],
    options: &ReconcileOptions,
    run_id: Uuid,
) -> anyhow::Result<RunStats> {
    let started = Instant::now();
    let mut stats = RunStats::new(run_id, options);
    let limit = options.limit.map(i64::from);

    if options.mode.runs_refresh() {
        let cards = store
            .candidates(options.target, Mapped::With, limit)
            .await
            .context("failed to list mapped cards")?;
        tracing::info!(cards = cards.len(), "starting refresh phase");
        let phase = refresh::run_refresh(store, client, &cards, kinds, options.dry_run)
            .instrument(tracing::info_span!("refresh"))
            .await;
        stats.push(Phase::Refresh, phase);
    }

    if options.mode.runs_match() {
        let cards = store
            .candidates(options.target, Mapped::Without, limit)
            .await
            .context("failed to list unmapped cards")?;
        tracing::info!(cards = cards.len(), "starting match phase");
        let phase = discover::run_discovery(store, client, &cards, kinds, options.dry_run)
            .instrument(tracing::info_span!("match"))
            .await;
        stats.push(Phase::Match, phase);
    }

    stats.duration = started.elapsed();
    Ok(stats)
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;

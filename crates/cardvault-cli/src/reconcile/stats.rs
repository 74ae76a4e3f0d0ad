//! Per-run counters and the operator-facing summary.

use std::fmt;
use std::time::Duration;

use cardvault_core::{Mode, Target};
use cardvault_pricing::NoMatchReason;
use uuid::Uuid;

use super::ReconcileOptions;

/// Terminal state of one processed card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CardOutcome {
    /// Mapping and/or prices written (or would be, on a dry run).
    Persisted { prices_written: u64 },
    Unmatched(NoMatchReason),
    Errored,
    /// Not attempted; the card lacks what a remote call needs.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Refresh,
    Match,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Refresh => f.pad("refresh"),
            Phase::Match => f.pad("match"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PhaseStats {
    pub processed: u64,
    /// Cards matched (discovery) or found by id (refresh).
    pub matched: u64,
    pub price_written: u64,
    pub no_results: u64,
    pub no_parallel_match: u64,
    pub errors: u64,
    pub skipped: u64,
    /// Remote call retries during this phase.
    pub retried: u64,
    pub duration: Duration,
}

impl PhaseStats {
    pub(crate) fn record(&mut self, outcome: CardOutcome) {
        self.processed += 1;
        match outcome {
            CardOutcome::Persisted { prices_written } => {
                self.matched += 1;
                self.price_written += prices_written;
            }
            CardOutcome::Unmatched(NoMatchReason::NoResults) => self.no_results += 1,
            CardOutcome::Unmatched(NoMatchReason::NoParallelMatch) => {
                self.no_parallel_match += 1;
            }
            CardOutcome::Errored => self.errors += 1,
            CardOutcome::Skipped => self.skipped += 1,
        }
    }

    pub(crate) fn no_match(&self) -> u64 {
        self.no_results + self.no_parallel_match
    }
}

/// Everything printed at the end of a run.
#[derive(Debug, Clone)]
pub(crate) struct RunStats {
    pub run_id: Uuid,
    pub target: Target,
    pub mode: Mode,
    pub dry_run: bool,
    pub phases: Vec<(Phase, PhaseStats)>,
    /// Wall-clock time for the whole run, all phases included.
    pub duration: Duration,
}

impl RunStats {
    pub(crate) fn new(run_id: Uuid, options: &ReconcileOptions) -> Self {
        Self {
            run_id,
            target: options.target,
            mode: options.mode,
            dry_run: options.dry_run,
            phases: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn push(&mut self, phase: Phase, stats: PhaseStats) {
        self.phases.push((phase, stats));
    }

    #[cfg(test)]
    pub(crate) fn phase(&self, phase: Phase) -> Option<&PhaseStats> {
        self.phases
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, s)| s)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reconcile run {} (target={}, mode={})",
            self.run_id, self.target, self.mode
        )?;
        if self.dry_run {
            write!(f, " [dry run: nothing written]")?;
        }
        for (phase, s) in &self.phases {
            write!(
                f,
                "\n  {phase:<7} processed={} matched={} price_written={} no_match={} \
                 (no_results={}, no_parallel_match={}) errors={} skipped={} retried={} \
                 duration={:.1}s",
                s.processed,
                s.matched,
                s.price_written,
                s.no_match(),
                s.no_results,
                s.no_parallel_match,
                s.errors,
                s.skipped,
                s.retried,
                s.duration.as_secs_f64(),
            )?;
        }
        let retried: u64 = self.phases.iter().map(|(_, s)| s.retried).sum();
        write!(
            f,
            "\n  total   retried={retried} duration={:.1}s",
            self.duration.as_secs_f64()
        )
    }
}

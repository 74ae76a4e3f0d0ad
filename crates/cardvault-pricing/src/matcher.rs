//! Decides which remote product, if any, is the same physical card as a
//! catalogued [`LocalCard`].
//!
//! The policy is first-qualifying-candidate-wins in API result order. There
//! is no scoring: two runs over the same API ordering always pick the same
//! product.

use cardvault_core::LocalCard;

use crate::normalize::{extract_variant, normalize_variant};
use crate::types::RemoteProduct;

/// Why no candidate was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    /// The search returned nothing.
    NoResults,
    /// Candidates came back but none had the right number and parallel.
    NoParallelMatch,
}

impl NoMatchReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NoMatchReason::NoResults => "no_results",
            NoMatchReason::NoParallelMatch => "no_parallel_match",
        }
    }
}

impl std::fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the parallel text a series carries beyond its set's display name.
///
/// `"2025 Topps Chrome Gold Refractors"` under set `"2025 Topps Chrome"`
/// yields `"Gold Refractors"`. When the series does not start with the set
/// name, or nothing is left after removing it, the series name is returned
/// unchanged.
#[must_use]
pub fn variant_text<'a>(series_name: &'a str, set_display_name: &str) -> &'a str {
    series_name
        .strip_prefix(set_display_name)
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(series_name)
}

/// Picks the first candidate representing the same card as `card`.
///
/// A candidate qualifies when its name contains the literal `#{card_number}`
/// token and its bracketed parallel agrees with the card's series:
///
/// - base series: only unbracketed (base) candidates qualify;
/// - parallel series: the candidate must have a parallel whose normalized
///   text equals, contains, or is contained by the series' normalized
///   parallel text. Empty normalized text never matches.
///
/// # Errors
///
/// Returns [`NoMatchReason::NoResults`] for an empty candidate list and
/// [`NoMatchReason::NoParallelMatch`] when no candidate qualifies.
pub fn find_match<'a>(
    card: &LocalCard,
    candidates: &'a [RemoteProduct],
    set_display_name: &str,
) -> Result<&'a RemoteProduct, NoMatchReason> {
    if candidates.is_empty() {
        return Err(NoMatchReason::NoResults);
    }

    let ours = variant_text(&card.series_name, set_display_name);
    let is_base = ours == set_display_name || ours == card.series_name;
    let ours_norm = normalize_variant(Some(ours));
    let number_token = format!("#{}", card.card_number);

    candidates
        .iter()
        .find(|candidate| {
            if !candidate.product_name.contains(&number_token) {
                return false;
            }
            let theirs = extract_variant(&candidate.product_name);
            if is_base {
                return theirs.is_none();
            }
            // A parallel never matches the base product.
            let Some(theirs) = theirs else {
                return false;
            };
            variants_agree(&ours_norm, &normalize_variant(Some(theirs)))
        })
        .ok_or(NoMatchReason::NoParallelMatch)
}

fn variants_agree(ours: &str, theirs: &str) -> bool {
    if ours.is_empty() || theirs.is_empty() {
        return false;
    }
    ours == theirs || ours.contains(theirs) || theirs.contains(ours)
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;

use super::*;

// -----------------------------------------------------------------------
// extract_variant
// -----------------------------------------------------------------------

#[test]
fn extract_variant_returns_bracket_contents() {
    assert_eq!(
        extract_variant("Aaron Judge [Gold Refractor] #99"),
        Some("Gold Refractor")
    );
}

#[test]
fn extract_variant_none_for_base_product() {
    assert_eq!(extract_variant("Aaron Judge #99"), None);
}

#[test]
fn extract_variant_takes_first_span_only() {
    assert_eq!(
        extract_variant("Shohei Ohtani [Red Wave] [/5] #17"),
        Some("Red Wave")
    );
}

#[test]
fn extract_variant_unclosed_bracket_is_base() {
    assert_eq!(extract_variant("Aaron Judge [Gold #99"), None);
}

#[test]
fn extract_variant_empty_brackets() {
    assert_eq!(extract_variant("Aaron Judge [] #99"), Some(""));
}

// -----------------------------------------------------------------------
// normalize_variant
// -----------------------------------------------------------------------

#[test]
fn normalize_variant_lowercases_and_strips_plural() {
    assert_eq!(normalize_variant(Some("Gold Refractors")), "gold refractor");
}

#[test]
fn normalize_variant_collapses_whitespace() {
    assert_eq!(
        normalize_variant(Some("  Gold \t  Wave   Refractor ")),
        "gold wave refractor"
    );
}

#[test]
fn normalize_variant_strips_only_one_trailing_s() {
    assert_eq!(normalize_variant(Some("Bosss")), "boss");
}

#[test]
fn normalize_variant_none_and_blank_are_empty() {
    assert_eq!(normalize_variant(None), "");
    assert_eq!(normalize_variant(Some("   ")), "");
}

#[test]
fn normalize_variant_singular_unchanged() {
    assert_eq!(normalize_variant(Some("Gold Refractor")), "gold refractor");
}

/// Known false positive of the plural heuristic: words that end in `s`
/// naturally lose it too. Both sides are normalized the same way, so
/// equality still holds between identical inputs.
#[test]
fn normalize_variant_plural_heuristic_trims_natural_s() {
    assert_eq!(normalize_variant(Some("Stained Glass")), "stained glas");
}

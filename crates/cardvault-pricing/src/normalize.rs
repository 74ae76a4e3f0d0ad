//! Variant text helpers for remote product names.
//!
//! Remote names carry the parallel in square brackets, e.g.
//! `"Aaron Judge [Gold Refractor] #99"`. A name without brackets is the base
//! card. Normalization is a cheap heuristic, not a dictionary of parallels.

/// Returns the text inside the first `[...]` span of `product_name`.
///
/// `None` means the product is the base (unparalleled) card. An opening
/// bracket with no closing bracket is treated as no variant.
#[must_use]
pub fn extract_variant(product_name: &str) -> Option<&str> {
    let open = product_name.find('[')?;
    let rest = &product_name[open + 1..];
    let close = rest.find(']')?;
    Some(&rest[..close])
}

/// Reduces variant text to a comparable form.
///
/// Lower-cases, collapses runs of whitespace to one space, and drops a single
/// trailing `s` so `"Gold Refractors"` and `"gold refractor"` compare equal.
/// `None` and blank input normalize to the empty string.
#[must_use]
pub fn normalize_variant(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    match collapsed.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => collapsed,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

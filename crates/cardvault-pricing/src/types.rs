//! Pricing API response types.
//!
//! Field names follow the API's hyphenated JSON keys. Prices are integer
//! cents and any of them may be absent or `null`.

use cardvault_core::PriceKind;
use serde::{Deserialize, Deserializer};

/// Envelope for `GET /products?q=...`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub products: Vec<RemoteProduct>,
}

/// One product as returned by search or direct lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteProduct {
    /// Sent as a JSON string by search and sometimes as a number by lookup.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name, e.g. `"Aaron Judge [Gold Refractor] #99"`.
    #[serde(rename = "product-name")]
    pub product_name: String,
    /// Category/set label, e.g. `"Baseball Cards 2025 Topps Chrome"`.
    #[serde(rename = "console-name", default)]
    pub console_name: Option<String>,
    #[serde(rename = "loose-price", default)]
    pub loose_price: Option<i64>,
    #[serde(rename = "graded-price", default)]
    pub graded_price: Option<i64>,
    #[serde(rename = "manual-only-price", default)]
    pub manual_only_price: Option<i64>,
}

impl RemoteProduct {
    /// Returns the price in cents for `kind`, or `None` when the API reported none.
    #[must_use]
    pub fn price_cents(&self, kind: PriceKind) -> Option<i64> {
        match kind {
            PriceKind::Loose => self.loose_price,
            PriceKind::Graded => self.graded_price,
            PriceKind::ManualOnly => self.manual_only_price,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

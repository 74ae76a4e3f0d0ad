//! Catalog-side types the reconciler consumes.
//!
//! These are read-only from the pricing subsystem's point of view; the
//! catalog owns them and the reconciler only looks them up by id.

/// A catalogued trading card joined with its series, set, and players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCard {
    pub id: i64,
    /// Printed card number; may be alphanumeric (e.g. `"US175"`).
    pub card_number: String,
    pub series_name: String,
    pub set_name: String,
    pub set_year: i32,
    /// Player full names in card order. Empty when the catalog has none linked.
    pub player_names: Vec<String>,
    /// Remote identifier already mapped for the target price source, if any.
    pub external_id: Option<String>,
}

impl LocalCard {
    /// Returns the set name as it appears in series names, e.g. `"2025 Topps Chrome"`.
    #[must_use]
    pub fn set_display_name(&self) -> String {
        format!("{} {}", self.set_year, self.set_name)
    }

    /// Builds the remote search text: `"{year} {set} {players} #{number}"`.
    ///
    /// Returns `None` when the card has no players, since a query without a
    /// name matches far too broadly to be useful.
    #[must_use]
    pub fn search_query(&self) -> Option<String> {
        if self.player_names.is_empty() {
            return None;
        }
        Some(format!(
            "{} {} {} #{}",
            self.set_year,
            self.set_name,
            self.player_names.join(" "),
            self.card_number
        ))
    }
}

/// A pricing condition tier persisted as a `price_types` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceKind {
    /// Ungraded ("loose") price.
    Loose,
    Graded,
    /// PSA 10, reported by the API as `manual-only-price`.
    ManualOnly,
}

impl PriceKind {
    /// The `price_types.name` this kind resolves to.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            PriceKind::Loose => "loose",
            PriceKind::Graded => "graded",
            PriceKind::ManualOnly => "psa10",
        }
    }

    /// Parses a configured kind name. Accepts the `price_types` name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loose" => Some(PriceKind::Loose),
            "graded" => Some(PriceKind::Graded),
            "psa10" | "manual-only" => Some(PriceKind::ManualOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for PriceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Which cards a reconcile run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The whole catalog minus excluded series, in catalog order.
    Catalog,
    /// Cards held in at least one active collection, most-owned first.
    Collection,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Catalog => write!(f, "catalog"),
            Target::Collection => write!(f, "collection"),
        }
    }
}

/// Which reconciliation strategies a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Refresh,
    Match,
    Both,
}

impl Mode {
    #[must_use]
    pub fn runs_refresh(self) -> bool {
        matches!(self, Mode::Refresh | Mode::Both)
    }

    #[must_use]
    pub fn runs_match(self) -> bool {
        matches!(self, Mode::Match | Mode::Both)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Refresh => write!(f, "refresh"),
            Mode::Match => write!(f, "match"),
            Mode::Both => write!(f, "both"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge() -> LocalCard {
        LocalCard {
            id: 1,
            card_number: "99".to_owned(),
            series_name: "2025 Topps Chrome".to_owned(),
            set_name: "Topps Chrome".to_owned(),
            set_year: 2025,
            player_names: vec!["Aaron Judge".to_owned()],
            external_id: None,
        }
    }

    #[test]
    fn set_display_name_prefixes_year() {
        assert_eq!(judge().set_display_name(), "2025 Topps Chrome");
    }

    #[test]
    fn search_query_includes_number_token() {
        assert_eq!(
            judge().search_query().as_deref(),
            Some("2025 Topps Chrome Aaron Judge #99")
        );
    }

    #[test]
    fn search_query_joins_multiple_players() {
        let mut card = judge();
        card.player_names.push("Juan Soto".to_owned());
        assert_eq!(
            card.search_query().as_deref(),
            Some("2025 Topps Chrome Aaron Judge Juan Soto #99")
        );
    }

    #[test]
    fn search_query_none_without_players() {
        let mut card = judge();
        card.player_names.clear();
        assert!(card.search_query().is_none());
    }

    #[test]
    fn price_kind_parse_accepts_aliases() {
        assert_eq!(PriceKind::parse("Loose"), Some(PriceKind::Loose));
        assert_eq!(PriceKind::parse(" graded "), Some(PriceKind::Graded));
        assert_eq!(PriceKind::parse("manual-only"), Some(PriceKind::ManualOnly));
        assert_eq!(PriceKind::parse("psa10"), Some(PriceKind::ManualOnly));
        assert_eq!(PriceKind::parse("mint"), None);
    }

    #[test]
    fn mode_phase_selection() {
        assert!(Mode::Both.runs_refresh() && Mode::Both.runs_match());
        assert!(Mode::Refresh.runs_refresh() && !Mode::Refresh.runs_match());
        assert!(!Mode::Match.runs_refresh() && Mode::Match.runs_match());
    }
}

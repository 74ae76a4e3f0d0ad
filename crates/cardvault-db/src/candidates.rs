//! Candidate-selection queries for reconcile runs.
//!
//! Both queries return [`LocalCard`]s joined with their series, set, ordered
//! players, and any existing mapping for the requested price source. All
//! user-controlled values are bound parameters.

use cardvault_core::LocalCard;
use sqlx::PgPool;

use crate::DbError;

/// Whether to select cards with or without an existing mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped {
    /// Cards with no `card_external_id` row for the source (discovery).
    Without,
    /// Cards already mapped for the source (refresh).
    With,
}

impl Mapped {
    fn as_bool(self) -> bool {
        matches!(self, Mapped::With)
    }
}

/// A row produced by the candidate queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub card_number: String,
    pub series_name: String,
    pub set_name: String,
    pub set_year: i32,
    pub player_names: Vec<String>,
    pub external_id: Option<String>,
}

impl From<CandidateRow> for LocalCard {
    fn from(row: CandidateRow) -> Self {
        LocalCard {
            id: row.id,
            card_number: row.card_number,
            series_name: row.series_name,
            set_name: row.set_name,
            set_year: row.set_year,
            player_names: row.player_names,
            external_id: row.external_id,
        }
    }
}

/// Lists catalog cards in id order, skipping series whose name contains any
/// of `excluded_series` (case-insensitive).
///
/// `limit = None` returns every eligible card.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_catalog_candidates(
    pool: &PgPool,
    price_source_id: i64,
    mapped: Mapped,
    excluded_series: &[String],
    limit: Option<i64>,
) -> Result<Vec<LocalCard>, DbError> {
    let patterns = like_patterns(excluded_series);

    let rows = sqlx::query_as::<_, CandidateRow>(
        "SELECT c.id, c.card_number, s.name AS series_name, st.name AS set_name, \
                st.year AS set_year, \
                COALESCE(ARRAY_AGG(p.full_name ORDER BY cp.position, p.id) \
                         FILTER (WHERE p.id IS NOT NULL), ARRAY[]::TEXT[]) AS player_names, \
                m.external_id \
         FROM cards c \
         JOIN series s ON s.id = c.series_id \
         JOIN sets st ON st.id = s.set_id \
         LEFT JOIN card_external_id m \
                ON m.card_id = c.id AND m.price_source_id = $1 \
         LEFT JOIN card_players cp ON cp.card_id = c.id \
         LEFT JOIN players p ON p.id = cp.player_id \
         WHERE (m.id IS NOT NULL) = $2 \
           AND NOT (s.name ILIKE ANY($3)) \
         GROUP BY c.id, s.name, st.name, st.year, m.external_id \
         ORDER BY c.id \
         LIMIT $4",
    )
    .bind(price_source_id)
    .bind(mapped.as_bool())
    .bind(&patterns)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(LocalCard::from).collect())
}

/// Lists cards held in at least one active collection, most distinct
/// owners first, ties in id order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_candidates(
    pool: &PgPool,
    price_source_id: i64,
    mapped: Mapped,
    limit: Option<i64>,
) -> Result<Vec<LocalCard>, DbError> {
    let rows = sqlx::query_as::<_, CandidateRow>(
        "WITH owners AS ( \
             SELECT card_id, COUNT(DISTINCT user_id) AS owner_count \
             FROM collection_cards \
             WHERE is_active \
             GROUP BY card_id \
         ) \
         SELECT c.id, c.card_number, s.name AS series_name, st.name AS set_name, \
                st.year AS set_year, \
                COALESCE(ARRAY_AGG(p.full_name ORDER BY cp.position, p.id) \
                         FILTER (WHERE p.id IS NOT NULL), ARRAY[]::TEXT[]) AS player_names, \
                m.external_id \
         FROM owners o \
         JOIN cards c ON c.id = o.card_id \
         JOIN series s ON s.id = c.series_id \
         JOIN sets st ON st.id = s.set_id \
         LEFT JOIN card_external_id m \
                ON m.card_id = c.id AND m.price_source_id = $1 \
         LEFT JOIN card_players cp ON cp.card_id = c.id \
         LEFT JOIN players p ON p.id = cp.player_id \
         WHERE (m.id IS NOT NULL) = $2 \
         GROUP BY c.id, s.name, st.name, st.year, m.external_id, o.owner_count \
         ORDER BY o.owner_count DESC, c.id \
         LIMIT $3",
    )
    .bind(price_source_id)
    .bind(mapped.as_bool())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(LocalCard::from).collect())
}

/// Wraps each fragment as `%fragment%`, escaping LIKE metacharacters.
fn like_patterns(fragments: &[String]) -> Vec<String> {
    fragments
        .iter()
        .map(|f| {
            let escaped = f
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_wrap_fragments() {
        let patterns = like_patterns(&["Autograph".to_owned(), "Printing Plate".to_owned()]);
        assert_eq!(patterns, vec!["%Autograph%", "%Printing Plate%"]);
    }

    #[test]
    fn like_patterns_escape_metacharacters() {
        let patterns = like_patterns(&["100%_Club".to_owned()]);
        assert_eq!(patterns, vec!["%100\\%\\_Club%"]);
    }

    #[test]
    fn candidate_row_converts_to_local_card() {
        let row = CandidateRow {
            id: 3,
            card_number: "US175".to_owned(),
            series_name: "2025 Topps Update".to_owned(),
            set_name: "Topps Update".to_owned(),
            set_year: 2025,
            player_names: vec!["Jackson Holliday".to_owned()],
            external_id: Some("88".to_owned()),
        };
        let card = LocalCard::from(row);
        assert_eq!(card.id, 3);
        assert_eq!(card.card_number, "US175");
        assert_eq!(card.external_id.as_deref(), Some("88"));
    }
}

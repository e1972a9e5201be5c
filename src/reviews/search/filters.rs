use serde::{Deserialize, Deserializer, Serialize};

use crate::proposals::{
    DELIBERATION_ACCEPTED, DELIBERATION_PENDING, DELIBERATION_REJECTED,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeliberationFilter {
    Pending,
    Accepted,
    Rejected,
}

impl DeliberationFilter {
    pub fn as_db_value(&self) -> &'static str {
        match self {
            DeliberationFilter::Pending => DELIBERATION_PENDING,
            DeliberationFilter::Accepted => DELIBERATION_ACCEPTED,
            DeliberationFilter::Rejected => DELIBERATION_REJECTED,
        }
    }
}

/// Parsed search filters, deserializable straight from the query string. The
/// search result echoes the normalized form back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalsFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<DeliberationFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
}

// An unfilled status select arrives as `status=`; unknown values are treated
// the same way rather than failing the whole request.
fn lenient_status<'de, D>(
    deserializer: D,
) -> Result<Option<DeliberationFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    Ok(match raw.as_deref() {
        Some("pending") => Some(DeliberationFilter::Pending),
        Some("accepted") => Some(DeliberationFilter::Accepted),
        Some("rejected") => Some(DeliberationFilter::Rejected),
        _ => None,
    })
}

// Far beyond any real result set; bounding the page keeps the query offset
// arithmetic away from i64 overflow on hostile input.
pub const MAX_PAGE: i64 = 1_000_000;

impl ProposalsFilters {
    /// Drops empty strings (an unfilled form field arrives as `""`, not as an
    /// absent key) and clamps the page number to `1..=MAX_PAGE`.
    pub fn normalize(mut self) -> Self {
        self.query = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        self.format = self.format.filter(|f| !f.is_empty());
        self.category = self.category.filter(|c| !c.is_empty());
        self.page = self.page.map(|p| p.clamp(1, MAX_PAGE));
        self
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_empty_fields() {
        let filters = ProposalsFilters {
            query: Some("  ".to_string()),
            format: Some(String::new()),
            category: Some("cat1".to_string()),
            page: Some(-3),
            ..Default::default()
        };

        let normalized = filters.normalize();

        assert_eq!(normalized.query, None);
        assert_eq!(normalized.format, None);
        assert_eq!(normalized.category, Some("cat1".to_string()));
        assert_eq!(normalized.page, Some(1));
    }

    #[test]
    fn page_numbers_are_clamped_to_a_sane_range() {
        let too_big = ProposalsFilters {
            page: Some(i64::MAX),
            ..Default::default()
        }
        .normalize();
        assert_eq!(too_big.page, Some(MAX_PAGE));

        let too_small = ProposalsFilters {
            page: Some(i64::MIN),
            ..Default::default()
        }
        .normalize();
        assert_eq!(too_small.page, Some(1));
    }

    #[test]
    fn status_round_trips_through_the_query_string() {
        let status: DeliberationFilter =
            serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, DeliberationFilter::Pending);
        assert_eq!(status.as_db_value(), "PENDING");
    }
}

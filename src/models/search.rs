use serde::{Deserialize, Serialize};

use super::post::{PostType, Priority};

/// Resolution-state filter: by default resolved and unresolved posts both
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedFilter {
    #[default]
    All,
    Resolved,
    Unresolved,
}

impl ResolvedFilter {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "resolved" => Self::Resolved,
            "unresolved" => Self::Unresolved,
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Relevance,
    Popularity,
}

impl SortMode {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "popularity" => Self::Popularity,
            _ => Self::Relevance,
        }
    }
}

/// The full filter set a search composes. All structured filters are
/// conjunctive with each other and with the free-text match.
///
/// Serialized as the `filters_json` snapshot persisted with query logs and
/// saved searches, so field names are part of the stored format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub post_types: Vec<PostType>,
    pub priorities: Vec<Priority>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub emergency_only: bool,
    pub resolved: ResolvedFilter,
    pub sort: SortMode,
}

impl SearchFilters {
    /// The trimmed free-text query, or None when effectively empty.
    #[must_use]
    pub fn query_text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Whether any structured filter narrows the result set. A search with
    /// no text and no structured filters is rejected as invalid.
    #[must_use]
    pub fn has_structured_filters(&self) -> bool {
        self.city.is_some()
            || self.state.is_some()
            || !self.post_types.is_empty()
            || !self.priorities.is_empty()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.emergency_only
            || self.resolved != ResolvedFilter::All
    }
}

/// Limit/offset pagination with the lenient coercion contract: malformed or
/// missing values fall back to defaults instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: u64,
    pub offset: u64,
}

impl PageParams {
    pub const DEFAULT_LIMIT: u64 = 20;

    #[must_use]
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>, max_limit: u64) -> Self {
        let limit = limit
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(max_limit);

        let offset = offset.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0);

        Self { limit, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_lenient_coercion() {
        let page = PageParams::from_raw(Some("abc"), Some("-3"), 100);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);

        let page = PageParams::from_raw(None, None, 100);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);

        let page = PageParams::from_raw(Some("50"), Some("10"), 100);
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 10);
    }

    #[test]
    fn test_page_params_capped_at_max() {
        let page = PageParams::from_raw(Some("5000"), None, 100);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn test_empty_search_has_no_filters() {
        let filters = SearchFilters::default();
        assert!(filters.query_text().is_none());
        assert!(!filters.has_structured_filters());
    }

    #[test]
    fn test_whitespace_query_is_empty() {
        let filters = SearchFilters {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filters.query_text().is_none());
    }

    #[test]
    fn test_emergency_flag_counts_as_structured_filter() {
        let filters = SearchFilters {
            emergency_only: true,
            ..Default::default()
        };
        assert!(filters.has_structured_filters());
    }

    #[test]
    fn test_filters_snapshot_round_trips() {
        let filters = SearchFilters {
            query: Some("flood".to_string()),
            priorities: vec![Priority::Urgent],
            emergency_only: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&filters).unwrap();
        let back: SearchFilters = serde_json::from_str(&json).unwrap();
        assert_eq!(back.priorities, vec![Priority::Urgent]);
        assert!(back.emergency_only);
    }
}

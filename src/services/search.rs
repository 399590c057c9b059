//! The search pipeline: filter composition, ranking, pagination, saved
//! searches, and the telemetry hand-off.

use std::time::Instant;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::db::{PostSelector, Store};
use crate::entities::saved_searches;
use crate::models::{PageParams, SearchFilters};
use crate::ranking::{RankedPost, sort_and_page};
use crate::services::TelemetryService;

/// Placeholder match score attached to every result: no true relevance
/// scoring is computed; the ordering contract carries the ranking.
pub const PLACEHOLDER_SCORE: f64 = 1.0;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid search: {0}")]
    Invalid(String),

    #[error("Saved search {0} not found")]
    SavedSearchNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One page of search results.
///
/// `has_more` is the page-full heuristic: true when the page came back at
/// exactly the requested limit. It can be wrong at an exact boundary; the
/// approximation is part of the API contract.
pub struct SearchPage {
    pub posts: Vec<RankedPost>,
    pub has_more: bool,
    pub execution_time_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct SaveSearchRequest {
    pub name: String,
    pub description: Option<String>,
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
}

#[derive(Clone)]
pub struct SearchService {
    store: Store,
    telemetry: TelemetryService,
}

impl SearchService {
    #[must_use]
    pub const fn new(store: Store, telemetry: TelemetryService) -> Self {
        Self { store, telemetry }
    }

    /// Runs a search. Telemetry (query log, stats backfill, suggestion
    /// upsert) is handed off fire-and-forget; its failures never affect the
    /// returned page.
    pub async fn search(
        &self,
        user_id: Option<i32>,
        filters: &SearchFilters,
        page: PageParams,
    ) -> Result<SearchPage, SearchError> {
        if filters.query_text().is_none() && !filters.has_structured_filters() {
            return Err(SearchError::Invalid(
                "a query or at least one filter is required".to_string(),
            ));
        }

        let started = Instant::now();
        self.telemetry.log_query(user_id, filters);

        let selector = PostSelector {
            text: filters.query_text(),
            city: filters.city.as_deref(),
            state: filters.state.as_deref(),
            post_types: &filters.post_types,
            priorities: &filters.priorities,
            date_from: filters.date_from.as_deref(),
            date_to: filters.date_to.as_deref(),
            emergency_only: filters.emergency_only,
            resolved: filters.resolved,
        };

        let now = Utc::now().to_rfc3339();
        let candidates = self.store.search_post_candidates(&selector, &now).await?;

        // Popularity sorting needs engagement before ranking, so counts are
        // fetched for the whole candidate set, not just the page.
        let ids: Vec<i32> = candidates.iter().map(|(p, _)| p.id).collect();
        let counts = self.store.engagement_counts(&ids).await?;

        let ranked: Vec<RankedPost> = candidates
            .into_iter()
            .map(|(post, author)| {
                let (comments, reactions) = counts.get(&post.id).copied().unwrap_or((0, 0));
                RankedPost {
                    post,
                    author,
                    distance_miles: 0.0,
                    comment_count: comments,
                    reaction_count: reactions,
                }
            })
            .collect();

        let posts = sort_and_page(ranked, filters.sort, false, page);
        let has_more = posts.len() as u64 == page.limit;
        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.telemetry
            .record_outcome(user_id, filters, posts.len() as i64, execution_time_ms);

        Ok(SearchPage {
            posts,
            has_more,
            execution_time_ms,
        })
    }

    /// Creates or overwrites the caller's (name) definition.
    pub async fn save_search(
        &self,
        user_id: i32,
        request: &SaveSearchRequest,
    ) -> Result<saved_searches::Model, SearchError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(SearchError::Invalid("a name is required".to_string()));
        }
        if request.query.trim().is_empty() && !request.filters.has_structured_filters() {
            return Err(SearchError::Invalid(
                "a query or at least one filter is required".to_string(),
            ));
        }

        let filters_json =
            serde_json::to_string(&request.filters).unwrap_or_else(|_| "{}".to_string());
        let now = Utc::now().to_rfc3339();

        Ok(self
            .store
            .upsert_saved_search(
                user_id,
                name,
                request.description.as_deref(),
                request.query.trim(),
                &filters_json,
                &now,
            )
            .await?)
    }

    pub async fn saved_searches(
        &self,
        user_id: i32,
    ) -> Result<Vec<saved_searches::Model>, SearchError> {
        Ok(self.store.list_saved_searches(user_id).await?)
    }

    /// Ownership failures surface as NotFound, matching the row-filtered
    /// query they come from. Callers depend on the 404 semantics.
    pub async fn delete_saved_search(&self, user_id: i32, id: i32) -> Result<(), SearchError> {
        let now = Utc::now().to_rfc3339();
        let deleted = self.store.delete_saved_search(id, user_id, &now).await?;
        if deleted {
            Ok(())
        } else {
            Err(SearchError::SavedSearchNotFound(id))
        }
    }

    /// Re-runs a saved search through the normal pipeline and updates its
    /// rolling statistics.
    pub async fn execute_saved_search(
        &self,
        user_id: i32,
        id: i32,
        page: PageParams,
    ) -> Result<(saved_searches::Model, SearchPage), SearchError> {
        let saved = self
            .store
            .get_saved_search(id, user_id)
            .await?
            .ok_or(SearchError::SavedSearchNotFound(id))?;

        let mut filters: SearchFilters =
            serde_json::from_str(&saved.filters_json).unwrap_or_default();
        if !saved.query_text.trim().is_empty() {
            filters.query = Some(saved.query_text.clone());
        }

        let result = self.search(Some(user_id), &filters, page).await?;

        let now = Utc::now().to_rfc3339();
        let count = i32::try_from(result.posts.len()).unwrap_or(i32::MAX);
        self.store
            .record_saved_search_execution(saved.id, count, &now)
            .await?;

        Ok((saved, result))
    }
}

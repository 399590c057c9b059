//! Best-effort search telemetry.
//!
//! Everything that writes here is fire-and-forget relative to the read path:
//! a failed log write, backfill or suggestion upsert is traced and dropped,
//! never surfaced to the caller of a search.

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::config::SearchConfig;
use crate::db::Store;
use crate::entities::search_suggestions;
use crate::models::SearchFilters;

#[derive(Clone)]
pub struct TelemetryService {
    store: Store,
    backfill_window_seconds: i64,
    trending_window_days: i64,
    popular_min_search_count: i32,
}

impl TelemetryService {
    #[must_use]
    pub fn new(store: Store, config: &SearchConfig) -> Self {
        Self {
            store,
            backfill_window_seconds: config.backfill_window_seconds,
            trending_window_days: config.trending_window_days,
            popular_min_search_count: config.popular_min_search_count,
        }
    }

    /// Appends a query-log row for an identified caller. Anonymous searches
    /// are not logged. Runs detached from the request.
    pub fn log_query(&self, user_id: Option<i32>, filters: &SearchFilters) {
        let Some(user_id) = user_id else {
            return;
        };

        let store = self.store.clone();
        let query_text = filters.query_text().unwrap_or("").to_string();
        let filters_json = serde_json::to_string(filters).unwrap_or_else(|_| "{}".to_string());
        let city = filters.city.clone();
        let state = filters.state.clone();

        tokio::spawn(async move {
            let now = Utc::now().to_rfc3339();
            if let Err(e) = store
                .log_search_query(
                    user_id,
                    &query_text,
                    &filters_json,
                    city.as_deref(),
                    state.as_deref(),
                    &now,
                )
                .await
            {
                debug!("search query log failed: {e}");
            }
        });
    }

    /// Records the outcome of a finished search: backfills the most recent
    /// matching log row inside the trailing window and bumps the suggestion
    /// aggregate. Detached and best-effort, like `log_query`.
    ///
    /// The backfill correlates by (user, query text, recency) — concurrent
    /// identical queries from one user can still attribute stats to the
    /// wrong row; the window link is inherently approximate.
    pub fn record_outcome(
        &self,
        user_id: Option<i32>,
        filters: &SearchFilters,
        result_count: i64,
        execution_time_ms: u64,
    ) {
        let store = self.store.clone();
        let window_seconds = self.backfill_window_seconds;
        let query_text = filters.query_text().map(ToString::to_string);
        let city = filters.city.clone();
        let state = filters.state.clone();

        tokio::spawn(async move {
            let now = Utc::now().to_rfc3339();

            if let (Some(user_id), Some(query)) = (user_id, query_text.as_deref()) {
                let window_start =
                    (Utc::now() - Duration::seconds(window_seconds)).to_rfc3339();
                let execution_ms = i32::try_from(execution_time_ms).unwrap_or(i32::MAX);
                let count = i32::try_from(result_count).unwrap_or(i32::MAX);

                if let Err(e) = store
                    .backfill_search_stats(user_id, query, count, execution_ms, &window_start)
                    .await
                {
                    debug!("search stats backfill failed: {e}");
                }
            }

            if let Some(query) = query_text.as_deref() {
                if let Err(e) = store
                    .upsert_suggestion(
                        query,
                        "query",
                        city.as_deref(),
                        state.as_deref(),
                        result_count,
                        &now,
                    )
                    .await
                {
                    debug!("suggestion upsert failed: {e}");
                }
            }
        });
    }

    /// Prefix-matched approved suggestions plus the popular-terms list.
    pub async fn suggestions(
        &self,
        prefix: &str,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<(Vec<search_suggestions::Model>, Vec<search_suggestions::Model>)> {
        let matches = self
            .store
            .suggestion_matches(prefix, city, state, limit)
            .await?;

        let since = (Utc::now() - Duration::days(self.trending_window_days)).to_rfc3339();
        let popular = self
            .store
            .popular_terms(&since, self.popular_min_search_count, limit)
            .await?;

        Ok((matches, popular))
    }

    pub async fn trending(
        &self,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        self.store.trending_terms(city, state, limit).await
    }
}

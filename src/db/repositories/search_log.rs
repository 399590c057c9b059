use anyhow::Result;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::{prelude::*, search_queries, search_suggestions};

pub struct SearchLogRepository {
    conn: DatabaseConnection,
}

impl SearchLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Appends a query-log row. Counts and latency start at zero and may be
    /// backfilled by `backfill_stats` shortly after.
    pub async fn insert_query(
        &self,
        user_id: i32,
        query_text: &str,
        filters_json: &str,
        city: Option<&str>,
        state: Option<&str>,
        now: &str,
    ) -> Result<()> {
        let row = search_queries::ActiveModel {
            user_id: Set(Some(user_id)),
            query_text: Set(query_text.to_string()),
            filters_json: Set(filters_json.to_string()),
            city: Set(city.map(ToString::to_string)),
            state: Set(state.map(ToString::to_string)),
            result_count: Set(0),
            execution_time_ms: Set(0),
            created_at: Set(now.to_string()),
            ..Default::default()
        };

        SearchQueries::insert(row).exec(&self.conn).await?;
        Ok(())
    }

    /// Best-effort correlation: the most recent row for the same user and
    /// query text created after `window_start` gets the observed counts.
    /// Concurrent identical queries from the same user can still race; that
    /// ambiguity is inherent to the window-based link.
    pub async fn backfill_stats(
        &self,
        user_id: i32,
        query_text: &str,
        result_count: i32,
        execution_time_ms: i32,
        window_start: &str,
    ) -> Result<bool> {
        let row = SearchQueries::find()
            .filter(search_queries::Column::UserId.eq(user_id))
            .filter(search_queries::Column::QueryText.eq(query_text))
            .filter(search_queries::Column::CreatedAt.gte(window_start))
            .order_by_desc(search_queries::Column::CreatedAt)
            .order_by_desc(search_queries::Column::Id)
            .one(&self.conn)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        let mut model: search_queries::ActiveModel = row.into();
        model.result_count = Set(result_count);
        model.execution_time_ms = Set(execution_time_ms);
        model.update(&self.conn).await?;

        Ok(true)
    }

    /// Increment-or-insert for the (text, type, city, state) aggregate.
    ///
    /// The running `result_count` is the halving formula
    /// `(old + new) / 2`, kept verbatim for compatibility with existing
    /// aggregates; it is not a true mean.
    pub async fn upsert_suggestion(
        &self,
        text: &str,
        suggestion_type: &str,
        city: Option<&str>,
        state: Option<&str>,
        result_count: i64,
        now: &str,
    ) -> Result<()> {
        let new_count = result_count as f64;

        let row = search_suggestions::ActiveModel {
            suggestion_text: Set(text.to_string()),
            suggestion_type: Set(suggestion_type.to_string()),
            city: Set(city.unwrap_or("").to_string()),
            state: Set(state.unwrap_or("").to_string()),
            search_count: Set(1),
            result_count: Set(new_count),
            click_through_rate: Set(0.0),
            is_approved: Set(true),
            is_trending: Set(false),
            trend_score: Set(0.0),
            category: Set(None),
            sentiment: Set(None),
            last_searched_at: Set(now.to_string()),
            ..Default::default()
        };

        SearchSuggestions::insert(row)
            .on_conflict(
                OnConflict::columns([
                    search_suggestions::Column::SuggestionText,
                    search_suggestions::Column::SuggestionType,
                    search_suggestions::Column::City,
                    search_suggestions::Column::State,
                ])
                .value(
                    search_suggestions::Column::SearchCount,
                    Expr::col(search_suggestions::Column::SearchCount).add(1),
                )
                .value(
                    search_suggestions::Column::ResultCount,
                    Expr::col(search_suggestions::Column::ResultCount)
                        .add(new_count)
                        .div(2.0),
                )
                .value(search_suggestions::Column::LastSearchedAt, now)
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Approved suggestions whose text starts with `prefix`, optionally
    /// scoped by city/state (rows without a location always qualify).
    pub async fn suggestion_matches(
        &self,
        prefix: &str,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        let mut query = SearchSuggestions::find()
            .filter(search_suggestions::Column::IsApproved.eq(true))
            .filter(search_suggestions::Column::SuggestionText.starts_with(prefix));

        if let Some(city) = city {
            query = query.filter(
                Condition::any()
                    .add(search_suggestions::Column::City.eq(city))
                    .add(search_suggestions::Column::City.eq("")),
            );
        }
        if let Some(state) = state {
            query = query.filter(
                Condition::any()
                    .add(search_suggestions::Column::State.eq(state))
                    .add(search_suggestions::Column::State.eq("")),
            );
        }

        Ok(query
            .order_by_desc(search_suggestions::Column::SearchCount)
            .order_by_desc(search_suggestions::Column::ClickThroughRate)
            .limit(limit)
            .all(&self.conn)
            .await?)
    }

    /// Frequently searched terms: more than `min_search_count` searches,
    /// seen since `since`.
    pub async fn popular_terms(
        &self,
        since: &str,
        min_search_count: i32,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        Ok(SearchSuggestions::find()
            .filter(search_suggestions::Column::IsApproved.eq(true))
            .filter(search_suggestions::Column::SearchCount.gt(min_search_count))
            .filter(search_suggestions::Column::LastSearchedAt.gte(since))
            .order_by_desc(search_suggestions::Column::SearchCount)
            .limit(limit)
            .all(&self.conn)
            .await?)
    }

    /// Rows flagged trending by the external batch process. `trend_score`,
    /// category and sentiment pass through untouched.
    pub async fn trending_terms(
        &self,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        let mut query =
            SearchSuggestions::find().filter(search_suggestions::Column::IsTrending.eq(true));

        if let Some(city) = city {
            query = query.filter(
                Condition::any()
                    .add(search_suggestions::Column::City.eq(city))
                    .add(search_suggestions::Column::City.eq("")),
            );
        }
        if let Some(state) = state {
            query = query.filter(
                Condition::any()
                    .add(search_suggestions::Column::State.eq(state))
                    .add(search_suggestions::Column::State.eq("")),
            );
        }

        Ok(query
            .order_by_desc(search_suggestions::Column::TrendScore)
            .order_by_desc(search_suggestions::Column::SearchCount)
            .limit(limit)
            .all(&self.conn)
            .await?)
    }
}

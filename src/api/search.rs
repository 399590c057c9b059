use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::posts::parse_user_id;
use super::{
    ApiError, ApiResponse, AppState, PaginationDto, PostDto, SavedSearchDto, SearchResponse,
    SuggestionDto, SuggestionsResponse, TrendingDto, TrendingLocationDto, TrendingResponse,
};
use crate::models::{PageParams, PostType, Priority, ResolvedFilter, SearchFilters, SortMode};
use crate::services::SaveSearchRequest;

/// Raw search query parameters. Everything is a string here so malformed
/// values can fall back instead of failing extraction; `user_id` is optional
/// because anonymous searches are allowed (they just go unlogged).
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub user_id: Option<String>,
    pub q: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub post_types: Option<String>,
    pub priorities: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub emergency_only: Option<String>,
    pub resolved: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchParams {
    fn to_filters(&self) -> SearchFilters {
        SearchFilters {
            query: self.q.clone(),
            city: self.city.clone().filter(|c| !c.trim().is_empty()),
            state: self.state.clone().filter(|s| !s.trim().is_empty()),
            post_types: self
                .post_types
                .as_deref()
                .map(PostType::parse_list)
                .unwrap_or_default(),
            priorities: self
                .priorities
                .as_deref()
                .map(Priority::parse_list)
                .unwrap_or_default(),
            date_from: self.date_from.clone().filter(|d| !d.trim().is_empty()),
            date_to: self.date_to.clone().filter(|d| !d.trim().is_empty()),
            emergency_only: self.emergency_only.as_deref() == Some("true"),
            resolved: self
                .resolved
                .as_deref()
                .map(ResolvedFilter::parse)
                .unwrap_or_default(),
            sort: self.sort.as_deref().map(SortMode::parse).unwrap_or_default(),
        }
    }

    fn caller(&self) -> Option<i32> {
        self.user_id
            .as_deref()
            .and_then(|s| s.trim().parse::<i32>().ok())
            .filter(|id| *id > 0)
    }
}

pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let filters = params.to_filters();
    let max_page_size = state.config.read().await.feed.max_page_size;
    let page = PageParams::from_raw(
        params.limit.as_deref(),
        params.offset.as_deref(),
        max_page_size,
    );

    let result = state
        .search_service
        .search(params.caller(), &filters, page)
        .await?;

    let posts: Vec<PostDto> = result.posts.into_iter().map(PostDto::from).collect();
    let returned = posts.len();

    Ok(Json(ApiResponse::success(SearchResponse {
        posts,
        has_more: result.has_more,
        execution_time_ms: result.execution_time_ms,
        pagination: PaginationDto {
            limit: page.limit,
            offset: page.offset,
            returned,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub q: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub limit: Option<String>,
}

pub async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<ApiResponse<SuggestionsResponse>>, ApiError> {
    let prefix = params.q.as_deref().map(str::trim).unwrap_or("");

    let limit = {
        let config = state.config.read().await;
        params
            .limit
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(config.search.suggestion_limit)
    };

    let (matches, popular) = state
        .telemetry
        .suggestions(
            prefix,
            params.city.as_deref(),
            params.state.as_deref(),
            limit,
        )
        .await?;

    Ok(Json(ApiResponse::success(SuggestionsResponse {
        suggestions: matches.into_iter().map(SuggestionDto::from).collect(),
        popular: popular.into_iter().map(SuggestionDto::from).collect(),
        query: prefix.to_string(),
    })))
}

pub async fn get_trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<ApiResponse<TrendingResponse>>, ApiError> {
    let limit = {
        let config = state.config.read().await;
        params
            .limit
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(config.search.suggestion_limit)
    };

    let city = params.city.clone().filter(|c| !c.trim().is_empty());
    let state_code = params.state.clone().filter(|s| !s.trim().is_empty());

    let terms = state
        .telemetry
        .trending(city.as_deref(), state_code.as_deref(), limit)
        .await?;

    Ok(Json(ApiResponse::success(TrendingResponse {
        trending: terms.into_iter().map(TrendingDto::from).collect(),
        location: TrendingLocationDto {
            city,
            state: state_code,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CallerParams {
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn save_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallerParams>,
    Json(request): Json<SaveSearchRequest>,
) -> Result<Json<ApiResponse<SavedSearchDto>>, ApiError> {
    let user_id = parse_user_id(params.user_id.as_deref())?;

    let saved = state.search_service.save_search(user_id, &request).await?;
    info!("Saved search '{}' for user {}", saved.name, user_id);

    Ok(Json(ApiResponse::success(SavedSearchDto::from(saved))))
}

pub async fn list_saved_searches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallerParams>,
) -> Result<Json<ApiResponse<Vec<SavedSearchDto>>>, ApiError> {
    let user_id = parse_user_id(params.user_id.as_deref())?;

    let saved = state.search_service.saved_searches(user_id).await?;

    Ok(Json(ApiResponse::success(
        saved.into_iter().map(SavedSearchDto::from).collect(),
    )))
}

pub async fn execute_saved_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<CallerParams>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let user_id = parse_user_id(params.user_id.as_deref())?;

    let max_page_size = state.config.read().await.feed.max_page_size;
    let page = PageParams::from_raw(
        params.limit.as_deref(),
        params.offset.as_deref(),
        max_page_size,
    );

    let (_, result) = state
        .search_service
        .execute_saved_search(user_id, id, page)
        .await?;

    let posts: Vec<PostDto> = result.posts.into_iter().map(PostDto::from).collect();
    let returned = posts.len();

    Ok(Json(ApiResponse::success(SearchResponse {
        posts,
        has_more: result.has_more,
        execution_time_ms: result.execution_time_ms,
        pagination: PaginationDto {
            limit: page.limit,
            offset: page.offset,
            returned,
        },
    })))
}

pub async fn delete_saved_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<CallerParams>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = parse_user_id(params.user_id.as_deref())?;

    state
        .search_service
        .delete_saved_search(user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(())))
}

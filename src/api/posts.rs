use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, FeedResponse, PaginationDto, PostDto};
use crate::models::PageParams;

/// Raw query parameters. Pagination values are coerced leniently; only the
/// caller identity is strict.
#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn nearby_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Result<Json<ApiResponse<FeedResponse>>, ApiError> {
    let user_id = parse_user_id(params.user_id.as_deref())?;

    let max_page_size = state.config.read().await.feed.max_page_size;
    let page = PageParams::from_raw(
        params.limit.as_deref(),
        params.offset.as_deref(),
        max_page_size,
    );

    let feed = state.feed_service.nearby_posts(user_id, page).await?;

    let posts: Vec<PostDto> = feed.posts.into_iter().map(PostDto::from).collect();
    let returned = posts.len();

    Ok(Json(ApiResponse::success(FeedResponse {
        posts,
        location: feed.scope,
        pagination: PaginationDto {
            limit: page.limit,
            offset: page.offset,
            returned,
        },
    })))
}

pub(super) fn parse_user_id(raw: Option<&str>) -> Result<i32, ApiError> {
    raw.and_then(|s| s.trim().parse::<i32>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::validation("A valid user_id is required"))
}

use serde::Serialize;

use crate::entities::{saved_searches, search_suggestions};
use crate::models::LocationScope;
use crate::ranking::RankedPost;
use crate::services::search::PLACEHOLDER_SCORE;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub post_type: String,
    pub priority: String,
    pub is_emergency: bool,
    pub is_resolved: bool,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub distance_miles: f64,
    pub score: f64,
    pub comment_count: i64,
    pub reaction_count: i64,
    pub author: AuthorDto,
}

#[derive(Debug, Serialize)]
pub struct AuthorDto {
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
}

impl From<RankedPost> for PostDto {
    fn from(ranked: RankedPost) -> Self {
        let post = ranked.post;
        Self {
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            post_type: post.post_type,
            priority: post.priority,
            is_emergency: post.is_emergency,
            is_resolved: post.is_resolved,
            city: post.city,
            state: post.state,
            latitude: post.location.map(|p| p.latitude),
            longitude: post.location.map(|p| p.longitude),
            images: post.images,
            tags: post.tags,
            created_at: post.created_at,
            distance_miles: ranked.distance_miles,
            score: PLACEHOLDER_SCORE,
            comment_count: ranked.comment_count,
            reaction_count: ranked.reaction_count,
            author: AuthorDto {
                first_name: ranked.author.first_name,
                last_name: ranked.author.last_name,
                profile_image: ranked.author.profile_image,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationDto {
    pub limit: u64,
    pub offset: u64,
    pub returned: usize,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<PostDto>,
    pub location: LocationScope,
    pub pagination: PaginationDto,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub posts: Vec<PostDto>,
    pub has_more: bool,
    pub execution_time_ms: u64,
    pub pagination: PaginationDto,
}

#[derive(Debug, Serialize)]
pub struct SuggestionDto {
    pub text: String,
    pub suggestion_type: String,
    pub search_count: i32,
    pub click_through_rate: f64,
}

impl From<search_suggestions::Model> for SuggestionDto {
    fn from(model: search_suggestions::Model) -> Self {
        Self {
            text: model.suggestion_text,
            suggestion_type: model.suggestion_type,
            search_count: model.search_count,
            click_through_rate: model.click_through_rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<SuggestionDto>,
    pub popular: Vec<SuggestionDto>,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct TrendingDto {
    pub text: String,
    pub search_count: i32,
    pub trend_score: f64,
}

impl From<search_suggestions::Model> for TrendingDto {
    fn from(model: search_suggestions::Model) -> Self {
        Self {
            text: model.suggestion_text,
            search_count: model.search_count,
            trend_score: model.trend_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub trending: Vec<TrendingDto>,
    pub location: TrendingLocationDto,
}

/// The city/state scope the trending read was answered for, echoed back so
/// clients can tell a regional list from the global one.
#[derive(Debug, Serialize)]
pub struct TrendingLocationDto {
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SavedSearchDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub query: String,
    pub filters_json: String,
    pub last_executed: Option<String>,
    pub last_result_count: i32,
    pub total_results: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<saved_searches::Model> for SavedSearchDto {
    fn from(model: saved_searches::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            query: model.query_text,
            filters_json: model.filters_json,
            last_executed: model.last_executed,
            last_result_count: model.last_result_count,
            total_results: model.total_results,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub total_users: u64,
    pub total_posts: u64,
    pub database_ok: bool,
}

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{FeedService, SearchService, TelemetryService};

mod error;
mod observability;
mod posts;
mod search;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub feed_service: FeedService,

    pub search_service: SearchService,

    pub telemetry: TelemetryService,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let telemetry = TelemetryService::new(store.clone(), &config.search);
    let feed_service = FeedService::new(store.clone(), &config.feed);
    let search_service = SearchService::new(store.clone(), telemetry.clone());

    Ok(Arc::new(AppState {
        config: Arc::new(RwLock::new(config)),
        store,
        feed_service,
        search_service,
        telemetry,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/posts", get(posts::nearby_posts))
        .route("/search/posts", get(search::search_posts))
        .route("/search/suggestions", get(search::get_suggestions))
        .route("/search/trending", get(search::get_trending))
        .route("/search/saved", get(search::list_saved_searches))
        .route("/search/saved", post(search::save_search))
        .route(
            "/search/saved/{id}/execute",
            post(search::execute_saved_search),
        )
        .route("/search/saved/{id}", delete(search::delete_saved_search))
        .route("/system/status", get(system::get_status))
        .route("/system/health", get(system::health_live))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::entities::{saved_searches, search_suggestions};
use crate::models::{Post, PostAuthor, UserProfile};

pub mod migrator;
pub mod repositories;

pub use repositories::post::{CandidateScope, PostSelector};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    fn search_log_repo(&self) -> repositories::search_log::SearchLogRepository {
        repositories::search_log::SearchLogRepository::new(self.conn.clone())
    }

    fn saved_search_repo(&self) -> repositories::saved_search::SavedSearchRepository {
        repositories::saved_search::SavedSearchRepository::new(self.conn.clone())
    }

    // --- users ---

    pub async fn get_user_profile(&self, id: i32) -> Result<Option<UserProfile>> {
        self.user_repo().get_profile(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    // --- posts ---

    pub async fn active_post_candidates(
        &self,
        scope: CandidateScope<'_>,
        now: &str,
    ) -> Result<Vec<(Post, PostAuthor)>> {
        self.post_repo().active_candidates(scope, now).await
    }

    pub async fn search_post_candidates(
        &self,
        selector: &PostSelector<'_>,
        now: &str,
    ) -> Result<Vec<(Post, PostAuthor)>> {
        self.post_repo().search_candidates(selector, now).await
    }

    pub async fn engagement_counts(&self, post_ids: &[i32]) -> Result<HashMap<i32, (i64, i64)>> {
        self.post_repo().engagement_counts(post_ids).await
    }

    pub async fn count_posts(&self) -> Result<u64> {
        self.post_repo().count().await
    }

    // --- search telemetry ---

    pub async fn log_search_query(
        &self,
        user_id: i32,
        query_text: &str,
        filters_json: &str,
        city: Option<&str>,
        state: Option<&str>,
        now: &str,
    ) -> Result<()> {
        self.search_log_repo()
            .insert_query(user_id, query_text, filters_json, city, state, now)
            .await
    }

    pub async fn backfill_search_stats(
        &self,
        user_id: i32,
        query_text: &str,
        result_count: i32,
        execution_time_ms: i32,
        window_start: &str,
    ) -> Result<bool> {
        self.search_log_repo()
            .backfill_stats(
                user_id,
                query_text,
                result_count,
                execution_time_ms,
                window_start,
            )
            .await
    }

    pub async fn upsert_suggestion(
        &self,
        text: &str,
        suggestion_type: &str,
        city: Option<&str>,
        state: Option<&str>,
        result_count: i64,
        now: &str,
    ) -> Result<()> {
        self.search_log_repo()
            .upsert_suggestion(text, suggestion_type, city, state, result_count, now)
            .await
    }

    pub async fn suggestion_matches(
        &self,
        prefix: &str,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        self.search_log_repo()
            .suggestion_matches(prefix, city, state, limit)
            .await
    }

    pub async fn popular_terms(
        &self,
        since: &str,
        min_search_count: i32,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        self.search_log_repo()
            .popular_terms(since, min_search_count, limit)
            .await
    }

    pub async fn trending_terms(
        &self,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<search_suggestions::Model>> {
        self.search_log_repo()
            .trending_terms(city, state, limit)
            .await
    }

    // --- saved searches ---

    pub async fn upsert_saved_search(
        &self,
        user_id: i32,
        name: &str,
        description: Option<&str>,
        query_text: &str,
        filters_json: &str,
        now: &str,
    ) -> Result<saved_searches::Model> {
        self.saved_search_repo()
            .upsert(user_id, name, description, query_text, filters_json, now)
            .await
    }

    pub async fn list_saved_searches(&self, user_id: i32) -> Result<Vec<saved_searches::Model>> {
        self.saved_search_repo().list(user_id).await
    }

    pub async fn get_saved_search(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<saved_searches::Model>> {
        self.saved_search_repo().get_owned(id, user_id).await
    }

    pub async fn delete_saved_search(&self, id: i32, user_id: i32, now: &str) -> Result<bool> {
        self.saved_search_repo().soft_delete(id, user_id, now).await
    }

    pub async fn record_saved_search_execution(
        &self,
        id: i32,
        result_count: i32,
        now: &str,
    ) -> Result<()> {
        self.saved_search_repo()
            .record_execution(id, result_count, now)
            .await
    }
}

use anyhow::Result;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, saved_searches};

pub struct SavedSearchRepository {
    conn: DatabaseConnection,
}

impl SavedSearchRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates or overwrites the (user, name) definition and returns the
    /// stored row. A previously soft-deleted row under the same name is
    /// revived with the new definition.
    pub async fn upsert(
        &self,
        user_id: i32,
        name: &str,
        description: Option<&str>,
        query_text: &str,
        filters_json: &str,
        now: &str,
    ) -> Result<saved_searches::Model> {
        let row = saved_searches::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            query_text: Set(query_text.to_string()),
            filters_json: Set(filters_json.to_string()),
            notifications_enabled: Set(false),
            notification_frequency: Set("daily".to_string()),
            total_results: Set(0),
            last_result_count: Set(0),
            last_executed: Set(None),
            is_active: Set(true),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
            ..Default::default()
        };

        SavedSearches::insert(row)
            .on_conflict(
                OnConflict::columns([
                    saved_searches::Column::UserId,
                    saved_searches::Column::Name,
                ])
                .update_columns([
                    saved_searches::Column::Description,
                    saved_searches::Column::QueryText,
                    saved_searches::Column::FiltersJson,
                    saved_searches::Column::IsActive,
                    saved_searches::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        let stored = SavedSearches::find()
            .filter(saved_searches::Column::UserId.eq(user_id))
            .filter(saved_searches::Column::Name.eq(name))
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("saved search vanished after upsert"))?;

        Ok(stored)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<saved_searches::Model>> {
        Ok(SavedSearches::find()
            .filter(saved_searches::Column::UserId.eq(user_id))
            .filter(saved_searches::Column::IsActive.eq(true))
            .order_by_desc(saved_searches::Column::UpdatedAt)
            .all(&self.conn)
            .await?)
    }

    /// Ownership-filtered read: a saved search another user owns, or one
    /// that was soft-deleted, reads as absent.
    pub async fn get_owned(&self, id: i32, user_id: i32) -> Result<Option<saved_searches::Model>> {
        Ok(SavedSearches::find_by_id(id)
            .filter(saved_searches::Column::UserId.eq(user_id))
            .filter(saved_searches::Column::IsActive.eq(true))
            .one(&self.conn)
            .await?)
    }

    pub async fn soft_delete(&self, id: i32, user_id: i32, now: &str) -> Result<bool> {
        let result = SavedSearches::update_many()
            .col_expr(saved_searches::Column::IsActive, Expr::value(false))
            .col_expr(saved_searches::Column::UpdatedAt, Expr::value(now))
            .filter(saved_searches::Column::Id.eq(id))
            .filter(saved_searches::Column::UserId.eq(user_id))
            .filter(saved_searches::Column::IsActive.eq(true))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Rolling statistics after an execution: last run time, last count,
    /// lifetime total.
    pub async fn record_execution(&self, id: i32, result_count: i32, now: &str) -> Result<()> {
        SavedSearches::update_many()
            .col_expr(saved_searches::Column::LastExecuted, Expr::value(now))
            .col_expr(
                saved_searches::Column::LastResultCount,
                Expr::value(result_count),
            )
            .col_expr(
                saved_searches::Column::TotalResults,
                Expr::col(saved_searches::Column::TotalResults).add(result_count),
            )
            .filter(saved_searches::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}

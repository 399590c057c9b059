use sea_orm::entity::prelude::*;

/// Append-only search log. `result_count` and `execution_time_ms` start at
/// zero and may be backfilled once within a short trailing window.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "search_queries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Nullable: anonymous searches are never logged, but the weak
    /// reference carries no cascade requirement either way.
    pub user_id: Option<i32>,
    pub query_text: String,
    #[sea_orm(column_type = "Text")]
    pub filters_json: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub result_count: i32,
    pub execution_time_ms: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

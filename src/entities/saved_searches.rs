use sea_orm::entity::prelude::*;

/// A user's named, re-runnable search. (user_id, name) is unique; re-saving
/// overwrites. `is_active = false` is the soft-delete state and reads treat
/// such rows as absent.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saved_searches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub query_text: String,
    #[sea_orm(column_type = "Text")]
    pub filters_json: String,
    pub notifications_enabled: bool,
    pub notification_frequency: String,
    pub total_results: i32,
    pub last_result_count: i32,
    pub last_executed: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

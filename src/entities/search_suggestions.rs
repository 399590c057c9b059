use sea_orm::entity::prelude::*;

/// Suggestion/trending aggregate keyed by (text, type, city, state).
///
/// City/state are '' rather than NULL: SQLite treats NULLs as distinct in
/// unique indexes, which would break the upsert for location-less rows.
///
/// `trend_score`, `category` and `sentiment` are produced by an external
/// batch process and carried opaquely.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "search_suggestions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub suggestion_text: String,
    pub suggestion_type: String,
    pub city: String,
    pub state: String,
    pub search_count: i32,
    /// Halving average of observed result counts, not a true mean.
    pub result_count: f64,
    pub click_through_rate: f64,
    pub is_approved: bool,
    pub is_trending: bool,
    pub trend_score: f64,
    pub category: Option<String>,
    pub sentiment: Option<String>,
    pub last_searched_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchQueries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchQueries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchQueries::UserId).integer())
                    .col(ColumnDef::new(SearchQueries::QueryText).string().not_null())
                    .col(
                        ColumnDef::new(SearchQueries::FiltersJson)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(SearchQueries::City).string())
                    .col(ColumnDef::new(SearchQueries::State).string())
                    .col(
                        ColumnDef::new(SearchQueries::ResultCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SearchQueries::ExecutionTimeMs)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SearchQueries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The stats backfill looks rows up by (user, text, recency).
        manager
            .create_index(
                Index::create()
                    .name("idx_search_queries_user_text_created")
                    .table(SearchQueries::Table)
                    .col(SearchQueries::UserId)
                    .col(SearchQueries::QueryText)
                    .col(SearchQueries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SearchSuggestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchSuggestions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::SuggestionText)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::SuggestionType)
                            .string()
                            .not_null()
                            .default("query"),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::City)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::State)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::SearchCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::ResultCount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::ClickThroughRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::IsApproved)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::IsTrending)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SearchSuggestions::TrendScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(SearchSuggestions::Category).string())
                    .col(ColumnDef::new(SearchSuggestions::Sentiment).string())
                    .col(
                        ColumnDef::new(SearchSuggestions::LastSearchedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict target of the suggestion upsert.
        manager
            .create_index(
                Index::create()
                    .name("idx_suggestions_key")
                    .table(SearchSuggestions::Table)
                    .col(SearchSuggestions::SuggestionText)
                    .col(SearchSuggestions::SuggestionType)
                    .col(SearchSuggestions::City)
                    .col(SearchSuggestions::State)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchSuggestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SearchQueries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchQueries {
    Table,
    Id,
    UserId,
    QueryText,
    FiltersJson,
    City,
    State,
    ResultCount,
    ExecutionTimeMs,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SearchSuggestions {
    Table,
    Id,
    SuggestionText,
    SuggestionType,
    City,
    State,
    SearchCount,
    ResultCount,
    ClickThroughRate,
    IsApproved,
    IsTrending,
    TrendScore,
    Category,
    Sentiment,
    LastSearchedAt,
}

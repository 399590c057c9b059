use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SavedSearches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedSearches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavedSearches::UserId).integer().not_null())
                    .col(ColumnDef::new(SavedSearches::Name).string().not_null())
                    .col(ColumnDef::new(SavedSearches::Description).string())
                    .col(ColumnDef::new(SavedSearches::QueryText).string().not_null())
                    .col(
                        ColumnDef::new(SavedSearches::FiltersJson)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(SavedSearches::NotificationsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SavedSearches::NotificationFrequency)
                            .string()
                            .not_null()
                            .default("daily"),
                    )
                    .col(
                        ColumnDef::new(SavedSearches::TotalResults)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavedSearches::LastResultCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SavedSearches::LastExecuted).timestamp())
                    .col(
                        ColumnDef::new(SavedSearches::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SavedSearches::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavedSearches::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_searches_user")
                            .from(SavedSearches::Table, SavedSearches::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Re-saving with the same name overwrites the prior definition.
        manager
            .create_index(
                Index::create()
                    .name("idx_saved_searches_user_name")
                    .table(SavedSearches::Table)
                    .col(SavedSearches::UserId)
                    .col(SavedSearches::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavedSearches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SavedSearches {
    Table,
    Id,
    UserId,
    Name,
    Description,
    QueryText,
    FiltersJson,
    NotificationsEnabled,
    NotificationFrequency,
    TotalResults,
    LastResultCount,
    LastExecuted,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

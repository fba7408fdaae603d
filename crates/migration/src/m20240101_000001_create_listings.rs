//! Create `listings` table.
//!
//! Required columns are NOT NULL; optional ones are nullable so that empty
//! form values can be stored as absent.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(pk_auto(Listings::Id))
                    .col(integer(Listings::UserId))
                    .col(string_len(Listings::Title, 255))
                    .col(text(Listings::Description))
                    .col(string_len(Listings::Salary, 45))
                    .col(string_len_null(Listings::Tags, 255))
                    .col(string_len_null(Listings::Company, 255))
                    .col(string_len_null(Listings::Address, 255))
                    .col(string_len(Listings::City, 45))
                    .col(string_len(Listings::State, 45))
                    .col(string_len_null(Listings::Phone, 45))
                    .col(string_len(Listings::Email, 255))
                    .col(text_null(Listings::Requirements))
                    .col(text_null(Listings::Benefits))
                    .col(
                        timestamp_with_time_zone(Listings::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index listing display order (newest first)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_listings_created_at")
                    .table(Listings::Table)
                    .col(Listings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Ownership lookups
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_listings_user")
                    .table(Listings::Table)
                    .col(Listings::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Listings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Salary,
    Tags,
    Company,
    Address,
    City,
    State,
    Phone,
    Email,
    Requirements,
    Benefits,
    CreatedAt,
}

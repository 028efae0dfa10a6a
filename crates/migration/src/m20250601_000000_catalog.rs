//! Current-state tables: users, categories, credit packages and products.
//!
//! Balances and stock carry `CHECK (… >= 0)` so the store itself rejects a
//! negative value even if an engine path forgot to validate.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    Name,
    PointBalance,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum CreditPackages {
    Table,
    Id,
    Name,
    Description,
    PriceMinor,
    RewardPoints,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Products {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    PointCost,
    StockQuantity,
    IsActive,
    IsInOfferPool,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::PointBalance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Users::PointBalance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Description).string().not_null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditPackages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditPackages::Name).string().not_null())
                    .col(
                        ColumnDef::new(CreditPackages::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPackages::PriceMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(CreditPackages::PriceMinor).gt(0)),
                    )
                    .col(
                        ColumnDef::new(CreditPackages::RewardPoints)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(CreditPackages::RewardPoints).gt(0)),
                    )
                    .col(
                        ColumnDef::new(CreditPackages::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CreditPackages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPackages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).string().not_null())
                    .col(ColumnDef::new(Products::CategoryId).string())
                    .col(
                        ColumnDef::new(Products::PointCost)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Products::PointCost).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Products::StockQuantity)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Products::StockQuantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Products::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Products::IsInOfferPool)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Products::ImageUrl)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-category_id")
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-offer_pool")
                    .table(Products::Table)
                    .col(Products::IsActive)
                    .col(Products::IsInOfferPool)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditPackages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

//! Append-only history: credit purchases and point redemptions.
//!
//! `(user_id, idempotency_key)` is unique per table; NULL keys never collide.

use sea_orm_migration::prelude::*;

use crate::m20250601_000000_catalog::{CreditPackages, Products, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum CreditPurchases {
    Table,
    Id,
    UserId,
    CreditPackageId,
    AmountPaidMinor,
    PointsAwarded,
    PurchasedAt,
    Status,
    IdempotencyKey,
}

#[derive(Iden)]
enum PointRedemptions {
    Table,
    Id,
    UserId,
    ProductId,
    PointsUsed,
    Quantity,
    RedeemedAt,
    Status,
    IdempotencyKey,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditPurchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditPurchases::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditPurchases::UserId).string().not_null())
                    .col(
                        ColumnDef::new(CreditPurchases::CreditPackageId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPurchases::AmountPaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPurchases::PointsAwarded)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(CreditPurchases::PointsAwarded).gt(0)),
                    )
                    .col(
                        ColumnDef::new(CreditPurchases::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditPurchases::Status).string().not_null())
                    .col(ColumnDef::new(CreditPurchases::IdempotencyKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_purchases-user_id")
                            .from(CreditPurchases::Table, CreditPurchases::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_purchases-credit_package_id")
                            .from(CreditPurchases::Table, CreditPurchases::CreditPackageId)
                            .to(CreditPackages::Table, CreditPackages::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-credit_purchases-user_id-purchased_at")
                    .table(CreditPurchases::Table)
                    .col(CreditPurchases::UserId)
                    .col(CreditPurchases::PurchasedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-credit_purchases-idempotency_key")
                    .table(CreditPurchases::Table)
                    .col(CreditPurchases::UserId)
                    .col(CreditPurchases::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointRedemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointRedemptions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointRedemptions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(PointRedemptions::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointRedemptions::PointsUsed)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(PointRedemptions::PointsUsed).gt(0)),
                    )
                    .col(
                        ColumnDef::new(PointRedemptions::Quantity)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(PointRedemptions::Quantity).gte(1)),
                    )
                    .col(
                        ColumnDef::new(PointRedemptions::RedeemedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointRedemptions::Status).string().not_null())
                    .col(ColumnDef::new(PointRedemptions::IdempotencyKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-point_redemptions-user_id")
                            .from(PointRedemptions::Table, PointRedemptions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-point_redemptions-product_id")
                            .from(PointRedemptions::Table, PointRedemptions::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-point_redemptions-user_id-redeemed_at")
                    .table(PointRedemptions::Table)
                    .col(PointRedemptions::UserId)
                    .col(PointRedemptions::RedeemedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-point_redemptions-idempotency_key")
                    .table(PointRedemptions::Table)
                    .col(PointRedemptions::UserId)
                    .col(PointRedemptions::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointRedemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditPurchases::Table).to_owned())
            .await?;
        Ok(())
    }
}
